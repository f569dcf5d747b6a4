//! Scenarios that must behave identically on every backend.
//!
//! Each scenario runs once against SQLite and once against the fake hosted
//! row store, both wired through the same configuration path the binary uses.

use std::collections::HashMap;
use std::time::Duration;

use inquiry_admin::{connect, BackendKind, Config};
use inquiry_core::{
    Gateway, GatewayError, PersistenceErrorKind, SubmissionInput, SubmissionStatus,
};
use inquiry_testkit::{sample_input, FakePostgrest};

struct Harness {
    gateway: Gateway,
    fake: Option<FakePostgrest>,
}

impl Harness {
    async fn relational() -> Self {
        let gateway = gateway_from(&[
            ("INQUIRY_BACKEND", "relational"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_POOL_SIZE", "1"),
        ])
        .await;
        Self {
            gateway,
            fake: None,
        }
    }

    async fn baas() -> Self {
        let fake = FakePostgrest::spawn_with("inquiries", "scenario-key").await;
        let base_url = fake.base_url();
        let gateway = gateway_from(&[
            ("INQUIRY_BACKEND", "baas"),
            ("SUPABASE_URL", base_url.as_str()),
            ("SUPABASE_KEY", fake.api_key()),
            ("SUPABASE_TABLE", fake.table()),
            ("SUPABASE_TIMEOUT_SECS", "5"),
        ])
        .await;
        Self {
            gateway,
            fake: Some(fake),
        }
    }

    /// Requests the backend has seen; always zero for the embedded database.
    fn backend_requests(&self) -> usize {
        self.fake.as_ref().map_or(0, FakePostgrest::request_count)
    }

    /// An identifier in the right space that no backend ever assigned.
    fn missing_id(&self) -> inquiry_core::SubmissionId {
        let raw = match self.fake {
            Some(_) => "00000000-0000-0000-0000-000000000000",
            None => "999999",
        };
        self.gateway.id_space().parse(raw).unwrap()
    }
}

async fn gateway_from(vars: &[(&str, &str)]) -> Gateway {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    connect(&config.backend).await.unwrap()
}

async fn pause() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

macro_rules! on_every_backend {
    ($scenario:ident) => {
        mod $scenario {
            use super::*;

            #[tokio::test]
            async fn relational() {
                super::$scenario(Harness::relational().await).await;
            }

            #[tokio::test]
            async fn baas() {
                super::$scenario(Harness::baas().await).await;
            }
        }
    };
}

// ============================================================================
// Scenarios
// ============================================================================

async fn save_applies_defaults(h: Harness) {
    let mut input = sample_input("Yamada");
    input.furigana = None;
    input.ip_address = None;

    let saved = h.gateway.save(input.clone()).await.unwrap();
    assert!(saved.id.is_assigned());
    assert_eq!(saved.status, SubmissionStatus::New);
    assert!(saved.updated_at.is_none());
    assert!(saved.furigana.is_none());
    assert!(saved.ip_address.is_none());
    assert_eq!(saved.name, input.name);
    assert_eq!(saved.email, input.email);
    assert_eq!(saved.message, input.message);

    let fetched = h.gateway.get(&saved.id).await.unwrap();
    assert_eq!(fetched, saved);
}
on_every_backend!(save_applies_defaults);

async fn list_is_newest_first_and_stable(h: Harness) {
    let mut saved = Vec::new();
    for name in ["first", "second", "third"] {
        saved.push(h.gateway.save(sample_input(name)).await.unwrap());
        pause().await;
    }
    assert!(saved[0].created_at < saved[1].created_at);
    assert!(saved[1].created_at < saved[2].created_at);

    let listed = h.gateway.list().await.unwrap();
    let names: Vec<_> = listed.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["third", "second", "first"]);

    let again = h.gateway.list().await.unwrap();
    assert_eq!(listed, again);
}
on_every_backend!(list_is_newest_first_and_stable);

async fn status_walk_stamps_updated_at(h: Harness) {
    let saved = h.gateway.save(sample_input("Suzuki")).await.unwrap();
    pause().await;

    let read = h
        .gateway
        .update_status(&saved.id, SubmissionStatus::Read)
        .await
        .unwrap();
    assert_eq!(read.status, SubmissionStatus::Read);
    let read_at = read.updated_at.unwrap();
    assert!(read_at >= saved.created_at);
    pause().await;

    let replied = h
        .gateway
        .update_status(&saved.id, SubmissionStatus::Replied)
        .await
        .unwrap();
    assert_eq!(replied.status, SubmissionStatus::Replied);
    assert!(replied.updated_at.unwrap() > read_at);

    // Nothing but status and updated_at moves.
    assert_eq!(replied.id, saved.id);
    assert_eq!(replied.created_at, saved.created_at);
    assert_eq!(replied.subject, saved.subject);

    let fetched = h.gateway.get(&saved.id).await.unwrap();
    assert_eq!(fetched, replied);
}
on_every_backend!(status_walk_stamps_updated_at);

async fn status_can_move_backwards(h: Harness) {
    let saved = h.gateway.save(sample_input("Takahashi")).await.unwrap();
    h.gateway
        .update_status(&saved.id, SubmissionStatus::Replied)
        .await
        .unwrap();

    let reopened = h
        .gateway
        .update_status(&saved.id, SubmissionStatus::New)
        .await
        .unwrap();
    assert_eq!(reopened.status, SubmissionStatus::New);
    assert!(reopened.updated_at.is_some());

    let fresh = h
        .gateway
        .list_by_status(SubmissionStatus::New)
        .await
        .unwrap();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].id, saved.id);
}
on_every_backend!(status_can_move_backwards);

async fn unknown_id_is_not_found(h: Harness) {
    let saved = h.gateway.save(sample_input("Watanabe")).await.unwrap();
    let before = h.gateway.list().await.unwrap();

    let err = h
        .gateway
        .update_status(&h.missing_id(), SubmissionStatus::Read)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = h.gateway.get(&h.missing_id()).await.unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(h.gateway.list().await.unwrap(), before);
    assert_eq!(h.gateway.get(&saved.id).await.unwrap(), saved);
}
on_every_backend!(unknown_id_is_not_found);

async fn invalid_input_never_reaches_backend(h: Harness) {
    let before = h.backend_requests();
    let input = SubmissionInput {
        phone: "   ".to_string(),
        ..sample_input("Nakamura")
    };

    let err = h.gateway.save(input).await.unwrap_err();
    match err {
        GatewayError::Validation(e) => assert!(e.to_string().contains("phone")),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(h.backend_requests(), before);
    assert!(h.gateway.list().await.unwrap().is_empty());
}
on_every_backend!(invalid_input_never_reaches_backend);

async fn connected_backend_is_ready(h: Harness) {
    assert!(h.gateway.is_ready().await);
    let expected = if h.fake.is_some() { "postgrest" } else { "sqlite" };
    assert_eq!(h.gateway.backend_name(), expected);
}
on_every_backend!(connected_backend_is_ready);

// ============================================================================
// Cross-backend equivalence
// ============================================================================

/// Backend-independent record of what a fixed call sequence observed.
#[derive(Debug, PartialEq)]
struct Observation {
    listed: Vec<(String, SubmissionStatus, bool)>,
    errors: Vec<Option<PersistenceErrorKind>>,
}

async fn observe(h: &Harness) -> Observation {
    let a = h.gateway.save(sample_input("alpha")).await.unwrap();
    pause().await;
    let b = h.gateway.save(sample_input("beta")).await.unwrap();
    pause().await;
    h.gateway.save(sample_input("gamma")).await.unwrap();

    h.gateway
        .update_status(&a.id, SubmissionStatus::Replied)
        .await
        .unwrap();
    h.gateway
        .update_status(&b.id, SubmissionStatus::Read)
        .await
        .unwrap();

    let mut errors = Vec::new();
    let blank = SubmissionInput {
        message: String::new(),
        ..sample_input("delta")
    };
    errors.push(h.gateway.save(blank).await.unwrap_err().persistence_kind());
    errors.push(
        h.gateway
            .update_status(&h.missing_id(), SubmissionStatus::Read)
            .await
            .unwrap_err()
            .persistence_kind(),
    );

    let listed = h
        .gateway
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|s| (s.name, s.status, s.updated_at.is_some()))
        .collect();

    Observation { listed, errors }
}

#[tokio::test]
async fn test_backends_are_interchangeable() {
    let relational = Harness::relational().await;
    let baas = Harness::baas().await;

    let left = observe(&relational).await;
    let right = observe(&baas).await;
    assert_eq!(left, right);

    assert_eq!(
        left.listed,
        vec![
            ("gamma".to_string(), SubmissionStatus::New, false),
            ("beta".to_string(), SubmissionStatus::Read, true),
            ("alpha".to_string(), SubmissionStatus::Replied, true),
        ]
    );
    assert_eq!(left.errors, vec![None, Some(PersistenceErrorKind::NotFound)]);
}

#[tokio::test]
async fn test_backend_kind_follows_config() {
    let config = Config::from_lookup(|key| match key {
        "INQUIRY_BACKEND" => Some("postgrest".to_string()),
        "SUPABASE_URL" => Some("http://127.0.0.1:9".to_string()),
        "SUPABASE_KEY" => Some("k".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.backend.kind(), BackendKind::Baas);

    // Building the row-store gateway does no I/O; an unreachable host only
    // shows up as not ready.
    let gateway = connect(&config.backend).await.unwrap();
    assert!(!gateway.is_ready().await);
}
