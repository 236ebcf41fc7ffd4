//! # Feed Formatter
//!
//! Renders feed submissions into cards for the chat room.
//! Self-post bodies are summarized to a character budget without ever cutting through a
//! markdown link (`[text](url)`): a link either fits entirely or is dropped for `...`.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::types::{Card, FeedItem};

pub const BODY_BUDGET: usize = 220;
pub const FIELD_VALUE_LIMIT: usize = 1024;
pub const FIELD_NAME_LIMIT: usize = 256;
/// Longer titles are cut to this many characters plus `..`
pub const TITLE_KEEP: usize = 98;
const ELLIPSIS: &str = "...";
const PERMALINK_BASE: &str = "https://reddit.com";
const IMAGE_HOST: &str = "https://i.redd.it";

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]\([^)]+\)").expect("valid regex"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));

pub struct FeedFormatter;

impl FeedFormatter {
    pub fn format_item(item: &FeedItem) -> Card {
        let thumbnail = (!item.is_self && item.url.contains(IMAGE_HOST)).then(|| item.url.clone());

        Card {
            title: Self::format_title(&item.title),
            url: Some(format!("{}{}", PERMALINK_BASE, item.permalink)),
            field_name: take_chars(&item.author, FIELD_NAME_LIMIT),
            field_value: take_chars(&Self::format_body(item), FIELD_VALUE_LIMIT),
            thumbnail,
        }
    }

    fn format_title(title: &str) -> String {
        if title.is_empty() {
            return "no title".to_string();
        }
        if title.chars().count() > TITLE_KEEP {
            format!("{}..", take_chars(title, TITLE_KEEP))
        } else {
            title.to_string()
        }
    }

    fn format_body(item: &FeedItem) -> String {
        if item.is_self {
            summarize(&item.body, BODY_BUDGET)
        } else {
            item.url.clone()
        }
    }
}

/// Truncates `text` to at most `budget` characters (plus a trailing `...` when a link had
/// to be dropped), never splitting a markdown link.
pub fn summarize(text: &str, budget: usize) -> String {
    let text = BLANK_LINES.replace_all(text, "\n");
    if text.chars().count() <= budget {
        return text.into_owned();
    }

    let mut out = String::new();
    let mut used = 0;
    let mut cursor = 0;

    for link in MARKDOWN_LINK.find_iter(&text) {
        let plain = &text[cursor..link.start()];
        if !push_plain(&mut out, &mut used, plain, budget) {
            return out;
        }

        let link_len = link.as_str().chars().count();
        if used + link_len > budget {
            out.push_str(ELLIPSIS);
            return out;
        }
        out.push_str(link.as_str());
        used += link_len;
        cursor = link.end();
    }

    push_plain(&mut out, &mut used, &text[cursor..], budget);
    out
}

/// Appends a plain segment, cutting it if needed. Returns false once the budget is spent.
fn push_plain(out: &mut String, used: &mut usize, plain: &str, budget: usize) -> bool {
    let len = plain.chars().count();
    if *used + len <= budget {
        out.push_str(plain);
        *used += len;
        return true;
    }
    let room = budget.saturating_sub(*used + ELLIPSIS.len());
    out.push_str(&take_chars(plain, room));
    out.push_str(ELLIPSIS);
    *used = budget;
    false
}

fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
