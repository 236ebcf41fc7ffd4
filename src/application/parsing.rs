//! # Parsing Utils
//!
//! Turns raw chat messages into command invocations and splits command arguments,
//! honouring double-quoted segments (`!add hi "hello there"`).

use crate::domain::traits::Invocation;

/// Parses `<prefix><name> <args>`. The name is lower-cased; `None` for non-commands.
pub fn parse_invocation(prefix: &str, body: &str, sender: &str) -> Option<Invocation> {
    let rest = body.trim().strip_prefix(prefix)?;
    let (name, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], rest[idx..].trim()),
        None => (rest, ""),
    };
    if name.is_empty() {
        return None;
    }
    Some(Invocation {
        name: name.to_lowercase(),
        args: args.to_string(),
        sender: sender.to_string(),
        thread: None,
    })
}

/// Splits on whitespace, keeping double-quoted segments together (quotes removed).
pub fn split_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in args.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    out.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invocation() {
        let inv = parse_invocation("!", "  !Docs obs setup ", "@u:x").unwrap();
        assert_eq!(inv.name, "docs");
        assert_eq!(inv.args, "obs setup");
        assert_eq!(inv.sender, "@u:x");

        let inv = parse_invocation("!", "!help", "@u:x").unwrap();
        assert_eq!(inv.name, "help");
        assert_eq!(inv.args, "");
    }

    #[test]
    fn test_non_commands() {
        assert!(parse_invocation("!", "hello", "@u:x").is_none());
        assert!(parse_invocation("!", "! spaced", "@u:x").is_none());
        assert!(parse_invocation("!", "!", "@u:x").is_none());
    }

    #[test]
    fn test_multi_char_prefix() {
        let inv = parse_invocation("nb!", "nb!ask why", "@u:x").unwrap();
        assert_eq!(inv.name, "ask");
        assert_eq!(inv.args, "why");
    }

    #[test]
    fn test_split_args_quotes() {
        assert_eq!(
            split_args(r#"obs "Use the OBS plugin"  extra"#),
            vec!["obs", "Use the OBS plugin", "extra"]
        );
        assert_eq!(split_args(r#"empty """#), vec!["empty", ""]);
        assert!(split_args("   ").is_empty());
    }
}
