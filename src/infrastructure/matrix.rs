//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the `matrix_sdk`.
//! Command replies go back to the room the command came from, inside the thread when the
//! command was posted in one; the feed poller gets a `MatrixService` for its configured
//! room once the first sync has populated the client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use matrix_sdk::Client;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::relation::{Replacement, Thread};
use matrix_sdk::ruma::events::room::message::{
    Relation, RoomMessageEventContent, RoomMessageEventContentWithoutRelation,
};
use matrix_sdk::ruma::{EventId, OwnedEventId, RoomId};

use crate::domain::traits::ChatProvider;

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
    thread_root: Option<OwnedEventId>,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self {
            room,
            thread_root: None,
        }
    }

    /// Messages sent through this service land in the thread rooted at `root`.
    pub fn in_thread(room: Room, root: &str) -> Result<Self> {
        let root = <&EventId>::try_from(root)
            .with_context(|| format!("Invalid thread root '{}'", root))?;
        Ok(Self {
            room,
            thread_root: Some(root.to_owned()),
        })
    }

    /// Looks up a joined room by id, e.g. the feed destination.
    pub fn for_room(client: &Client, room_id: &str) -> Result<Self> {
        let room_id = <&RoomId>::try_from(room_id)
            .with_context(|| format!("Invalid room id '{}'", room_id))?;
        let room = client
            .get_room(room_id)
            .with_context(|| format!("Bot has not joined room {}", room_id))?;
        Ok(Self::new(room))
    }

    async fn internal_send(&self, mut content: RoomMessageEventContent) -> Result<OwnedEventId> {
        if let Some(root) = &self.thread_root {
            content.relates_to = Some(Relation::Thread(Thread::plain(root.clone(), root.clone())));
        }
        let resp = self.room.send(content).await?;
        Ok(resp.event_id)
    }

    async fn internal_edit(&self, event_id: &str, new_content: &str) -> Result<()> {
        let event_id = <&EventId>::try_from(event_id)?;
        let mut content = RoomMessageEventContent::text_markdown(new_content);
        let replacement_content = RoomMessageEventContentWithoutRelation::from(content.clone());

        content.relates_to = Some(Relation::Replacement(Replacement::new(
            event_id.to_owned(),
            replacement_content,
        )));

        self.room.send(content).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    async fn send_message(&self, content: &str) -> Result<String, String> {
        tracing::info!("Bot sending message to {}: {}", self.room_id(), content);
        self.internal_send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|id| id.to_string())
            .map_err(|e| e.to_string())
    }

    async fn edit_message(&self, message_id: &str, content: &str) -> Result<(), String> {
        self.internal_edit(message_id, content)
            .await
            .map_err(|e| e.to_string())
    }

    async fn send_notification(&self, content: &str) -> Result<(), String> {
        self.internal_send(RoomMessageEventContent::notice_markdown(content))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn typing(&self, active: bool) -> Result<(), String> {
        self.room
            .typing_notice(active)
            .await
            .map_err(|e| e.to_string())
    }
}
