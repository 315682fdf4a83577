// libs/consultation-cell/src/services/registry.rs
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ConsultationError;
use crate::models::{ConsultationRoom, Persisted, RegistryStats, RoomStatus, WriteStatus};
use crate::services::store::{write_status, RecordStore};

struct RoomSlot {
    room: Arc<Mutex<ConsultationRoom>>,
    /// Bumped under the state lock on every change.
    version: AtomicU64,
    /// Newest version handed to the store. Only writers wait on it.
    written: Mutex<WrittenVersion>,
}

struct WrittenVersion {
    version: u64,
    write: WriteStatus,
}

impl RoomSlot {
    fn new(room: ConsultationRoom) -> Self {
        Self {
            room: Arc::new(Mutex::new(room)),
            version: AtomicU64::new(1),
            written: Mutex::new(WrittenVersion {
                version: 0,
                write: WriteStatus::Unchanged,
            }),
        }
    }

    /// Call with the state lock held.
    fn bump(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Authoritative in-memory room state.
///
/// Locks are taken in the order room state, `active_pairs`, room index. The
/// index is never held while a room is being locked, and no state lock is
/// held while a write is awaited.
pub struct SessionRegistry {
    rooms: RwLock<HashMap<String, Arc<RoomSlot>>>,
    /// (doctor_id, patient_id) → the pair's non-Ended room.
    active_pairs: Mutex<HashMap<(Uuid, Uuid), String>>,
    store: Arc<dyn RecordStore>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            active_pairs: Mutex::new(HashMap::new()),
            store,
        }
    }

    pub async fn create_room(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
    ) -> Result<Persisted<ConsultationRoom>, ConsultationError> {
        let mut pairs = self.active_pairs.lock().await;

        if let Some(existing) = pairs.get(&(doctor_id, patient_id)) {
            debug!(
                "Doctor {} and patient {} already share room {}",
                doctor_id, patient_id, existing
            );
            return Err(ConsultationError::DuplicateSession {
                doctor_id,
                patient_id,
                room_id: existing.clone(),
            });
        }

        let room = ConsultationRoom::new(generate_room_code(), doctor_id, patient_id);
        let slot = Arc::new(RoomSlot::new(room.clone()));

        self.rooms
            .write()
            .await
            .insert(room.room_id.clone(), Arc::clone(&slot));
        pairs.insert((doctor_id, patient_id), room.room_id.clone());
        drop(pairs);

        info!(
            "Created room {} for doctor {} and patient {}",
            room.room_id, doctor_id, patient_id
        );

        Ok(self.persist(&slot, room, 1).await)
    }

    pub async fn activate(&self, room_id: &str) -> Result<Persisted<ConsultationRoom>, ConsultationError> {
        let slot = self.slot(room_id).await?;

        let (snapshot, version) = {
            let mut room = slot.room.lock().await;
            Self::transition(&mut room, RoomStatus::Active)?;
            room.started_at = Some(Utc::now());
            (room.clone(), slot.bump())
        };

        info!("Room {} is now active", room_id);
        Ok(self.persist(&slot, snapshot, version).await)
    }

    /// Idempotent: ending an Ended room succeeds without touching it.
    pub async fn end(&self, room_id: &str) -> Result<Persisted<ConsultationRoom>, ConsultationError> {
        let slot = self.slot(room_id).await?;

        let (snapshot, version) = {
            let mut room = slot.room.lock().await;

            if room.status.is_terminal() {
                debug!("Room {} already ended", room_id);
                return Ok(Persisted {
                    record: room.clone(),
                    write: WriteStatus::Unchanged,
                });
            }

            Self::transition(&mut room, RoomStatus::Ended)?;
            room.ended_at = Some(Utc::now());

            let mut pairs = self.active_pairs.lock().await;
            let key = (room.doctor_id, room.patient_id);
            if pairs.get(&key).is_some_and(|open| open == room_id) {
                pairs.remove(&key);
            }

            (room.clone(), slot.bump())
        };

        info!("Room {} ended", room_id);
        Ok(self.persist(&slot, snapshot, version).await)
    }

    pub async fn get(&self, room_id: &str) -> Result<ConsultationRoom, ConsultationError> {
        let slot = self.slot(room_id).await?;
        let room = slot.room.lock().await;
        Ok(room.clone())
    }

    /// Rooms where the participant is the doctor or the patient, oldest first.
    pub async fn list_by_participant(&self, participant_id: Uuid) -> Vec<ConsultationRoom> {
        let mut rooms: Vec<ConsultationRoom> = self
            .snapshot()
            .await
            .into_iter()
            .filter(|room| room.has_participant(participant_id))
            .collect();

        rooms.sort_by_key(|room| room.created_at);
        rooms
    }

    pub async fn rooms(&self) -> Vec<ConsultationRoom> {
        self.snapshot().await
    }

    pub async fn stats(&self) -> RegistryStats {
        self.snapshot()
            .await
            .iter()
            .fold(RegistryStats::default(), |mut stats, room| {
                stats.total += 1;
                match room.status {
                    RoomStatus::Waiting => stats.waiting += 1,
                    RoomStatus::Active => stats.active += 1,
                    RoomStatus::Ended => stats.ended += 1,
                }
                stats
            })
    }

    /// Locks a room that has not ended. The guard keeps `end` out until dropped.
    pub async fn lock_open(&self, room_id: &str) -> Result<OwnedMutexGuard<ConsultationRoom>, ConsultationError> {
        let slot = self.slot(room_id).await?;
        let room = Arc::clone(&slot.room).lock_owned().await;

        if room.status.is_terminal() {
            return Err(ConsultationError::RoomClosed(room_id.to_string()));
        }

        Ok(room)
    }

    async fn slot(&self, room_id: &str) -> Result<Arc<RoomSlot>, ConsultationError> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .ok_or_else(|| ConsultationError::RoomNotFound(room_id.to_string()))
    }

    async fn snapshot(&self) -> Vec<ConsultationRoom> {
        let slots: Vec<Arc<RoomSlot>> = self.rooms.read().await.values().cloned().collect();

        let mut rooms = Vec::with_capacity(slots.len());
        for slot in slots {
            rooms.push(slot.room.lock().await.clone());
        }
        rooms
    }

    fn transition(room: &mut ConsultationRoom, to: RoomStatus) -> Result<(), ConsultationError> {
        if !room.status.can_transition_to(&to) {
            warn!(
                "Rejected transition of room {} from {} to {}",
                room.room_id, room.status, to
            );
            return Err(ConsultationError::InvalidTransition {
                room_id: room.room_id.clone(),
                from: room.status,
                to,
            });
        }

        room.status = to;
        Ok(())
    }

    /// Writes `snapshot` unless a newer version of the room already reached
    /// the store, in which case that write's outcome covers this change too.
    async fn persist(&self, slot: &RoomSlot, snapshot: ConsultationRoom, version: u64) -> Persisted<ConsultationRoom> {
        let mut written = slot.written.lock().await;

        if written.version > version {
            debug!(
                "Room {} version {} superseded by stored version {}",
                snapshot.room_id, version, written.version
            );
            return Persisted {
                record: snapshot,
                write: written.write.clone(),
            };
        }

        let write = write_status(self.store.save_room(&snapshot).await, &snapshot.room_id);
        *written = WrittenVersion {
            version,
            write: write.clone(),
        };

        Persisted {
            record: snapshot,
            write,
        }
    }
}

fn generate_room_code() -> String {
    format!("room_{}", Uuid::new_v4().simple())
}
