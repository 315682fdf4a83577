// libs/consultation-cell/tests/registry_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use uuid::Uuid;

use consultation_cell::error::ConsultationError;
use consultation_cell::models::{RoomStatus, WriteStatus};
use consultation_cell::services::{MemoryRecordStore, SessionRegistry};

fn setup() -> (Arc<SessionRegistry>, Arc<MemoryRecordStore>) {
    let store = Arc::new(MemoryRecordStore::new());
    let registry = Arc::new(SessionRegistry::new(store.clone()));
    (registry, store)
}

#[tokio::test]
async fn test_create_room_starts_waiting_and_persists() {
    let (registry, store) = setup();
    let doctor = Uuid::new_v4();
    let patient = Uuid::new_v4();

    let created = registry.create_room(doctor, patient).await.unwrap();

    assert_eq!(created.write, WriteStatus::Durable);
    assert_eq!(created.record.status, RoomStatus::Waiting);
    assert!(created.record.room_id.starts_with("room_"));
    assert!(created.record.started_at.is_none());

    let stored = store.room(&created.record.room_id).await.unwrap();
    assert_eq!(stored, created.record);
}

#[tokio::test]
async fn test_second_room_for_same_pair_is_duplicate() {
    let (registry, _) = setup();
    let doctor = Uuid::new_v4();
    let patient = Uuid::new_v4();

    let first = registry.create_room(doctor, patient).await.unwrap().record;
    let second = registry.create_room(doctor, patient).await;

    assert_matches!(
        second,
        Err(ConsultationError::DuplicateSession { room_id, .. }) if room_id == first.room_id
    );

    // A different patient with the same doctor is fine.
    assert!(registry.create_room(doctor, Uuid::new_v4()).await.is_ok());
}

#[tokio::test]
async fn test_pair_may_meet_again_after_end() {
    let (registry, _) = setup();
    let doctor = Uuid::new_v4();
    let patient = Uuid::new_v4();

    let first = registry.create_room(doctor, patient).await.unwrap().record;
    registry.end(&first.room_id).await.unwrap();

    let second = registry.create_room(doctor, patient).await.unwrap().record;
    assert_ne!(first.room_id, second.room_id);
}

#[tokio::test]
async fn test_lifecycle_records_timestamps() {
    let (registry, store) = setup();
    let room = registry
        .create_room(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap()
        .record;

    let active = registry.activate(&room.room_id).await.unwrap().record;
    assert_eq!(active.status, RoomStatus::Active);
    assert!(active.started_at.is_some());

    let ended = registry.end(&room.room_id).await.unwrap().record;
    assert_eq!(ended.status, RoomStatus::Ended);
    assert!(ended.ended_at.is_some());
    assert_eq!(ended.started_at, active.started_at);

    assert_eq!(store.room(&room.room_id).await.unwrap().status, RoomStatus::Ended);
}

#[tokio::test]
async fn test_waiting_room_can_end_directly() {
    let (registry, _) = setup();
    let room = registry
        .create_room(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap()
        .record;

    let ended = registry.end(&room.room_id).await.unwrap().record;

    assert_eq!(ended.status, RoomStatus::Ended);
    assert!(ended.started_at.is_none());
}

#[tokio::test]
async fn test_activate_rejected_outside_waiting() {
    let (registry, _) = setup();
    let room = registry
        .create_room(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap()
        .record;

    registry.activate(&room.room_id).await.unwrap();
    assert_matches!(
        registry.activate(&room.room_id).await,
        Err(ConsultationError::InvalidTransition { from: RoomStatus::Active, to: RoomStatus::Active, .. })
    );

    registry.end(&room.room_id).await.unwrap();
    assert_matches!(
        registry.activate(&room.room_id).await,
        Err(ConsultationError::InvalidTransition { from: RoomStatus::Ended, .. })
    );
}

#[tokio::test]
async fn test_repeat_end_keeps_original_end_time() {
    let (registry, _) = setup();
    let room = registry
        .create_room(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap()
        .record;

    let first = registry.end(&room.room_id).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = registry.end(&room.room_id).await.unwrap();

    assert_eq!(second.write, WriteStatus::Unchanged);
    assert_eq!(second.record.ended_at, first.record.ended_at);
}

#[tokio::test]
async fn test_unknown_room_is_not_found() {
    let (registry, _) = setup();

    assert_matches!(registry.get("room_missing").await, Err(ConsultationError::RoomNotFound(_)));
    assert_matches!(registry.activate("room_missing").await, Err(ConsultationError::RoomNotFound(_)));
    assert_matches!(registry.end("room_missing").await, Err(ConsultationError::RoomNotFound(_)));
}

#[tokio::test]
async fn test_concurrent_activates_have_one_winner() {
    let (registry, _) = setup();
    let room = registry
        .create_room(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap()
        .record;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let registry = registry.clone();
            let room_id = room.room_id.clone();
            tokio::spawn(async move { registry.activate(&room_id).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert_matches!(e, ConsultationError::InvalidTransition { .. }),
        }
    }

    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_concurrent_creates_for_one_pair_have_one_winner() {
    let (registry, _) = setup();
    let doctor = Uuid::new_v4();
    let patient = Uuid::new_v4();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.create_room(doctor, patient).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(registry.list_by_participant(patient).await.len(), 1);
}

#[tokio::test]
async fn test_listing_and_stats() {
    let (registry, _) = setup();
    let doctor = Uuid::new_v4();

    let first = registry.create_room(doctor, Uuid::new_v4()).await.unwrap().record;
    let second = registry.create_room(doctor, Uuid::new_v4()).await.unwrap().record;
    let other = registry
        .create_room(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap()
        .record;

    registry.activate(&second.room_id).await.unwrap();
    registry.end(&other.room_id).await.unwrap();

    let doctor_rooms = registry.list_by_participant(doctor).await;
    let mut ids: Vec<&str> = doctor_rooms.iter().map(|r| r.room_id.as_str()).collect();
    let mut expected = vec![first.room_id.as_str(), second.room_id.as_str()];
    ids.sort();
    expected.sort();
    assert_eq!(ids, expected);
    assert!(doctor_rooms.windows(2).all(|w| w[0].created_at <= w[1].created_at));

    let stats = registry.stats().await;
    assert_eq!(stats.total, 3);
    assert_eq!(stats.waiting, 1);
    assert_eq!(stats.active, 1);
    assert_eq!(stats.ended, 1);
}

#[tokio::test]
async fn test_lock_open_rejects_ended_room() {
    let (registry, _) = setup();
    let room = registry
        .create_room(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap()
        .record;

    {
        let guard = registry.lock_open(&room.room_id).await.unwrap();
        assert_eq!(guard.room_id, room.room_id);
    }

    registry.end(&room.room_id).await.unwrap();
    assert_matches!(
        registry.lock_open(&room.room_id).await,
        Err(ConsultationError::RoomClosed(_))
    );
}
