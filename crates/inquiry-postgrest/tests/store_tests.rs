//! Row-store adapter tests against the in-process fake PostgREST server.

use std::time::Duration;

use chrono::Utc;
use inquiry_core::{
    NewSubmission, Operation, PersistenceErrorKind, SubmissionId, SubmissionStatus,
    SubmissionStore,
};
use inquiry_postgrest::{PostgrestClient, PostgrestConfig, PostgrestSubmissionStore};
use inquiry_testkit::{sample_input, FakePostgrest};
use serde_json::json;

const SCHEMA: &str = include_str!("../sql/contact_submissions.sql");

fn store_for(fake: &FakePostgrest) -> PostgrestSubmissionStore {
    store_with_key(fake, fake.api_key())
}

fn store_with_key(fake: &FakePostgrest, key: &str) -> PostgrestSubmissionStore {
    let config = PostgrestConfig::new(fake.base_url(), key)
        .with_table(fake.table())
        .with_timeout(Duration::from_secs(5));
    PostgrestSubmissionStore::new(PostgrestClient::new(config).unwrap())
}

fn new_submission(name: &str) -> NewSubmission {
    NewSubmission::new(sample_input(name))
}

// ============================================================================
// Happy paths
// ============================================================================

mod happy_path_tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_returns_backend_assigned_fields() {
        let fake = FakePostgrest::spawn().await;
        let store = store_for(&fake);

        let saved = store.insert(&new_submission("Sato")).await.unwrap();
        assert!(matches!(&saved.id, SubmissionId::Key(key) if !key.is_empty()));
        assert_eq!(saved.status, SubmissionStatus::New);
        assert!(saved.updated_at.is_none());
        assert_eq!(saved.furigana.as_deref(), Some("サトウ ケン"));
        assert_eq!(fake.row_count(), 1);
    }

    #[tokio::test]
    async fn test_optional_fields_sent_as_null() {
        let fake = FakePostgrest::spawn().await;
        let store = store_for(&fake);

        let mut input = sample_input("Kato");
        input.furigana = None;
        input.ip_address = None;
        let saved = store.insert(&NewSubmission::new(input)).await.unwrap();

        let row = fake.row(&saved.id.to_string()).unwrap();
        assert!(row["furigana"].is_null());
        assert!(row["ip_address"].is_null());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let fake = FakePostgrest::spawn().await;
        let store = store_for(&fake);

        for name in ["first", "second", "third"] {
            store.insert(&new_submission(name)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let listed = store.list().await.unwrap();
        let names: Vec<_> = listed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_equal_timestamps_order_by_id() {
        let fake = FakePostgrest::spawn().await;
        let store = store_for(&fake);

        let mut ids = Vec::new();
        for name in ["a", "b", "c"] {
            let saved = store.insert(&new_submission(name)).await.unwrap();
            let id = saved.id.to_string();
            fake.set_created_at(&id, "2026-03-01T09:00:00.000000Z");
            ids.push(id);
        }
        ids.sort();
        ids.reverse();

        let first = store.list().await.unwrap();
        let listed: Vec<_> = first.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(listed, ids);
        assert_eq!(store.list().await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_update_then_read_back() {
        let fake = FakePostgrest::spawn().await;
        let store = store_for(&fake);
        let saved = store.insert(&new_submission("Ito")).await.unwrap();
        let before = fake.request_count();

        let updated = store
            .update_status(&saved.id, SubmissionStatus::Read, Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.status, SubmissionStatus::Read);
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.created_at, saved.created_at);
        assert_eq!(updated.message, saved.message);

        // One PATCH plus one confirmatory GET.
        assert_eq!(fake.request_count() - before, 2);
    }

    #[tokio::test]
    async fn test_ready_probe() {
        let fake = FakePostgrest::spawn().await;
        assert!(store_for(&fake).is_ready().await);
        assert!(!store_with_key(&fake, "wrong-key").is_ready().await);
    }
}

// ============================================================================
// Error translation
// ============================================================================

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let fake = FakePostgrest::spawn().await;
        let store = store_for(&fake);
        let saved = store.insert(&new_submission("Abe")).await.unwrap();

        let missing = SubmissionId::Key("00000000-0000-0000-0000-000000000000".to_string());
        let err = store
            .update_status(&missing, SubmissionStatus::Read, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::NotFound);

        assert_eq!(err.operation(), Operation::UpdateStatus);

        let err = store.fetch(&missing).await.unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::NotFound);
        assert_eq!(err.operation(), Operation::Get);

        let untouched = store.fetch(&saved.id).await.unwrap();
        assert_eq!(untouched, saved);
    }

    #[tokio::test]
    async fn test_malformed_key_is_not_found() {
        let fake = FakePostgrest::spawn().await;
        let store = store_for(&fake);
        let garbled = SubmissionId::Key("abc".to_string());

        // A uuid column rejects the filter value itself.
        fake.fail_with(400, "22P02", "invalid input syntax for type uuid: \"abc\"");

        let err = store.fetch(&garbled).await.unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::NotFound);

        let err = store
            .update_status(&garbled, SubmissionStatus::Read, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::NotFound);
        assert_eq!(err.operation(), Operation::UpdateStatus);
    }

    #[tokio::test]
    async fn test_unreadable_insert_response_names_stored_row() {
        let fake = FakePostgrest::spawn().await;
        let store = store_for(&fake);
        fake.force_column("created_at", json!("not a timestamp"));

        let err = store.insert(&new_submission("Kudo")).await.unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::WriteFailed);
        assert_eq!(fake.row_count(), 1);

        let source = std::error::Error::source(&err).unwrap().to_string();
        assert!(source.contains("was stored"));
    }

    #[tokio::test]
    async fn test_serial_id_never_queried() {
        let fake = FakePostgrest::spawn().await;
        let store = store_for(&fake);

        let err = store
            .update_status(&SubmissionId::Serial(1), SubmissionStatus::Read, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::NotFound);
        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn test_error_object_maps_by_operation() {
        let fake = FakePostgrest::spawn().await;
        let store = store_for(&fake);
        let saved = store.insert(&new_submission("Mori")).await.unwrap();

        fake.fail_with(503, "PGRST000", "Could not connect with the database");

        let err = store.insert(&new_submission("Mori")).await.unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::WriteFailed);

        let err = store.list().await.unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::ReadFailed);

        let err = store
            .update_status(&saved.id, SubmissionStatus::Replied, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::WriteFailed);

        fake.recover();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_backend_detail_stays_out_of_message() {
        let fake = FakePostgrest::spawn().await;
        let store = store_for(&fake);
        fake.fail_with(500, "XX000", "internal: relation pg_secret_table");

        let err = store.list().await.unwrap_err();
        assert!(!err.to_string().contains("pg_secret_table"));
        let source = std::error::Error::source(&err).unwrap().to_string();
        assert!(source.contains("XX000"));
    }

    #[tokio::test]
    async fn test_rejected_key_is_write_failure() {
        let fake = FakePostgrest::spawn().await;
        let store = store_with_key(&fake, "wrong-key");

        let err = store.insert(&new_submission("Ueda")).await.unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::WriteFailed);
        assert_eq!(fake.row_count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let fake = FakePostgrest::spawn().await;
        let store = store_for(&fake);
        fake.shutdown().await;

        let err = store.insert(&new_submission("Noda")).await.unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::WriteFailed);
        let err = store.list().await.unwrap_err();
        assert_eq!(err.kind(), PersistenceErrorKind::ReadFailed);
        assert!(!store.is_ready().await);
    }
}

// ============================================================================
// Table definition
// ============================================================================

mod schema_tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_declares_every_stored_column() {
        let fake = FakePostgrest::spawn().await;
        let saved = store_for(&fake)
            .insert(&new_submission("Oka"))
            .await
            .unwrap();

        let row = fake.row(&saved.id.to_string()).unwrap();
        for column in row.as_object().unwrap().keys() {
            let declared = format!("\n    {} ", column);
            assert!(SCHEMA.contains(&declared), "column {} not in schema", column);
        }
    }

    #[test]
    fn test_schema_backend_assigns_id_and_created_at() {
        assert!(SCHEMA.contains("id uuid PRIMARY KEY DEFAULT gen_random_uuid()"));
        assert!(SCHEMA.contains("created_at timestamptz NOT NULL DEFAULT now()"));
        assert!(SCHEMA.contains("CHECK (status IN ('new', 'read', 'replied'))"));
    }
}
