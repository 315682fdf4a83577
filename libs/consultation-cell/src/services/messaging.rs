// libs/consultation-cell/src/services/messaging.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, Stream};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ConsultationError;
use crate::models::{ChatMessage, Persisted, SenderRole};
use crate::services::registry::SessionRegistry;
use crate::services::store::{write_status, RecordStore};

pub type MessageSender = mpsc::UnboundedSender<ChatMessage>;
pub type MessageReceiver = mpsc::UnboundedReceiver<ChatMessage>;

/// A participant's ordered feed of a room's messages. The feed ends when the
/// participant leaves or the room's channel is closed.
#[derive(Debug)]
pub struct Subscription {
    room_id: String,
    participant_id: Uuid,
    receiver: MessageReceiver,
}

impl Subscription {
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn participant_id(&self) -> Uuid {
        self.participant_id
    }

    pub async fn recv(&mut self) -> Option<ChatMessage> {
        self.receiver.recv().await
    }

    /// Next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<ChatMessage> {
        self.receiver.try_recv().ok()
    }

    pub fn into_stream(self) -> impl Stream<Item = ChatMessage> + Send + 'static {
        stream::unfold(self.receiver, |mut receiver| async move {
            receiver.recv().await.map(|message| (message, receiver))
        })
    }
}

/// Per-room publish/subscribe.
///
/// Sends hold the room's lock from the status check through fan-out, so a
/// send never lands after `end` has returned. Lock order is room, then
/// channels.
pub struct MessageRouter {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn RecordStore>,
    channels: RwLock<HashMap<String, HashMap<Uuid, MessageSender>>>,
}

impl MessageRouter {
    pub fn new(registry: Arc<SessionRegistry>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            registry,
            store,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Returns `None` when the participant already holds a live subscription.
    /// A subscription whose receiver was dropped is replaced.
    pub async fn join_channel(
        &self,
        room_id: &str,
        participant_id: Uuid,
    ) -> Result<Option<Subscription>, ConsultationError> {
        let _room = self.registry.lock_open(room_id).await?;
        let mut channels = self.channels.write().await;
        let members = channels.entry(room_id.to_string()).or_default();

        if members
            .get(&participant_id)
            .is_some_and(|sender| !sender.is_closed())
        {
            debug!("Participant {} already in room {} channel", participant_id, room_id);
            return Ok(None);
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        members.insert(participant_id, sender);

        info!("Participant {} joined room {} channel", participant_id, room_id);
        Ok(Some(Subscription {
            room_id: room_id.to_string(),
            participant_id,
            receiver,
        }))
    }

    /// Returns whether the participant was a member.
    pub async fn leave_channel(&self, room_id: &str, participant_id: Uuid) -> bool {
        let mut channels = self.channels.write().await;

        let Some(members) = channels.get_mut(room_id) else {
            return false;
        };

        let removed = members.remove(&participant_id).is_some();
        if members.is_empty() {
            channels.remove(room_id);
        }

        if removed {
            info!("Participant {} left room {} channel", participant_id, room_id);
        }
        removed
    }

    pub async fn send(
        &self,
        room_id: &str,
        sender_id: Uuid,
        sender_role: SenderRole,
        body: &str,
    ) -> Result<Persisted<ChatMessage>, ConsultationError> {
        if body.trim().is_empty() {
            return Err(ConsultationError::ValidationError(
                "Message body must not be empty".to_string(),
            ));
        }

        let room = self.registry.lock_open(room_id).await?;

        if !room.is_sender(sender_id, sender_role) {
            return Err(ConsultationError::ValidationError(format!(
                "Sender {} is not the {} of room {}",
                sender_id, sender_role, room_id
            )));
        }

        let message = ChatMessage {
            id: Uuid::new_v4(),
            room_id: room_id.to_string(),
            sender_id,
            sender_role,
            body: body.to_string(),
            timestamp: Utc::now(),
        };

        let delivered = self.fan_out(&message).await;
        drop(room);

        debug!(
            "Message {} in room {} delivered to {} members",
            message.id, room_id, delivered
        );

        let write = write_status(self.store.save_message(&message).await, &message.id.to_string());
        Ok(Persisted {
            record: message,
            write,
        })
    }

    /// Drops every subscription of the room so their streams end.
    pub async fn close_channel(&self, room_id: &str) -> usize {
        let closed = self
            .channels
            .write()
            .await
            .remove(room_id)
            .map(|members| members.len())
            .unwrap_or(0);

        if closed > 0 {
            info!("Closed room {} channel with {} members", room_id, closed);
        }
        closed
    }

    /// Members currently holding a live subscription.
    pub async fn members(&self, room_id: &str) -> Vec<Uuid> {
        let channels = self.channels.read().await;

        let mut members: Vec<Uuid> = channels
            .get(room_id)
            .map(|members| {
                members
                    .iter()
                    .filter(|(_, sender)| !sender.is_closed())
                    .map(|(id, _)| *id)
                    .collect()
            })
            .unwrap_or_default();

        members.sort();
        members
    }

    /// Delivers to every member except the sender; dead subscriptions are skipped.
    async fn fan_out(&self, message: &ChatMessage) -> usize {
        let channels = self.channels.read().await;

        let Some(members) = channels.get(&message.room_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (participant_id, sender) in members {
            if *participant_id == message.sender_id {
                continue;
            }
            if sender.send(message.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }
}
