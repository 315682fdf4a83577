// libs/consultation-cell/src/services/store.rs
use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::{SupabaseClient, WriteMode};

use crate::models::{ChatMessage, ConsultationRoom, WriteStatus};

/// Durable record of rooms and chat messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Upserts the room's current state.
    async fn save_room(&self, room: &ConsultationRoom) -> Result<()>;

    /// Appends a message.
    async fn save_message(&self, message: &ChatMessage) -> Result<()>;

    /// Messages of a room, oldest first.
    async fn find_by_room(&self, room_id: &str) -> Result<Vec<ChatMessage>>;
}

/// Maps a write result onto a `WriteStatus`, logging failures.
pub(crate) fn write_status(result: Result<()>, record: &str) -> WriteStatus {
    match result {
        Ok(()) => WriteStatus::Durable,
        Err(e) => {
            warn!("Degraded write for {}: {}", record, e);
            WriteStatus::Degraded {
                reason: e.to_string(),
            }
        }
    }
}

pub struct SupabaseRecordStore {
    supabase: SupabaseClient,
    token: String,
}

impl SupabaseRecordStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            token: config.record_store_token().to_string(),
        }
    }
}

#[async_trait]
impl RecordStore for SupabaseRecordStore {
    async fn save_room(&self, room: &ConsultationRoom) -> Result<()> {
        let body = serde_json::to_value(room)?;
        self.supabase
            .write(
                "/rest/v1/consultation_rooms?on_conflict=room_id",
                Some(&self.token),
                body,
                WriteMode::Upsert,
            )
            .await
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<()> {
        let body = serde_json::to_value(message)?;
        self.supabase
            .write("/rest/v1/chat_messages", Some(&self.token), body, WriteMode::Insert)
            .await
    }

    async fn find_by_room(&self, room_id: &str) -> Result<Vec<ChatMessage>> {
        let path = format!("/rest/v1/chat_messages?room_id=eq.{}&order=timestamp.asc", room_id);
        let mut messages: Vec<ChatMessage> = self
            .supabase
            .request(Method::GET, &path, Some(&self.token), None)
            .await?;

        messages.sort_by_key(|m| m.timestamp);
        debug!("Loaded {} messages for room {}", messages.len(), room_id);
        Ok(messages)
    }
}

/// Process-local store for deployments without a database and for tests.
#[derive(Default)]
pub struct MemoryRecordStore {
    rooms: RwLock<HashMap<String, ConsultationRoom>>,
    messages: RwLock<Vec<ChatMessage>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn room(&self, room_id: &str) -> Option<ConsultationRoom> {
        self.rooms.read().await.get(room_id).cloned()
    }

    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn save_room(&self, room: &ConsultationRoom) -> Result<()> {
        self.rooms
            .write()
            .await
            .insert(room.room_id.clone(), room.clone());
        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<()> {
        self.messages.write().await.push(message.clone());
        Ok(())
    }

    async fn find_by_room(&self, room_id: &str) -> Result<Vec<ChatMessage>> {
        let mut messages: Vec<ChatMessage> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect();

        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }
}
