//! In-memory chat used by the unit tests of the command layer.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::traits::ChatProvider;

#[derive(Default)]
pub struct RecordingChat {
    sent: Mutex<Vec<String>>,
    edits: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingChat {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub async fn messages(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }

    /// `(event id, new content)` pairs in edit order
    pub async fn edits(&self) -> Vec<(String, String)> {
        self.edits.lock().await.clone()
    }
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn send_message(&self, content: &str) -> Result<String, String> {
        if self.fail {
            return Err("M_FORBIDDEN".to_string());
        }
        self.sent.lock().await.push(content.to_string());
        Ok(format!("$event{}", self.sent.lock().await.len()))
    }

    async fn edit_message(&self, message_id: &str, content: &str) -> Result<(), String> {
        if self.fail {
            return Err("M_FORBIDDEN".to_string());
        }
        self.edits
            .lock()
            .await
            .push((message_id.to_string(), content.to_string()));
        Ok(())
    }

    fn room_id(&self) -> String {
        "!room:test".to_string()
    }
}
