//! In-process stand-in for a hosted PostgREST table.
//!
//! Implements the subset of PostgREST the row-store adapter uses: insert with
//! `Prefer: return=representation`, select with `id=eq.` filters and
//! `order=created_at.desc[,id.desc]`, single-object selects (406 / `PGRST116`
//! when the match count is not one) and filtered PATCH. It assigns UUID ids
//! and `created_at` itself, counts every request, and can be told to fail.
//! Column rules mirror `crates/inquiry-postgrest/sql/contact_submissions.sql`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Default key the fake accepts.
pub const TEST_API_KEY: &str = "test-service-role-key";

/// Default table name.
pub const TEST_TABLE: &str = "contact_submissions";

const COLUMNS: [&str; 12] = [
    "id",
    "name",
    "furigana",
    "email",
    "phone",
    "inquiry_type",
    "subject",
    "message",
    "ip_address",
    "status",
    "created_at",
    "updated_at",
];

const NOT_NULL: [&str; 6] = ["name", "email", "phone", "inquiry_type", "subject", "message"];

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

struct Row {
    seq: u64,
    fields: Map<String, Value>,
}

impl Row {
    fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    fn created_at(&self) -> &str {
        self.fields
            .get("created_at")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

#[derive(Clone)]
struct Failure {
    status: StatusCode,
    body: Value,
}

struct FakeState {
    table: String,
    api_key: String,
    rows: Mutex<Vec<Row>>,
    next_seq: AtomicU64,
    requests: AtomicUsize,
    failure: Mutex<Option<Failure>>,
    forced: Mutex<Map<String, Value>>,
}

type Shared = Arc<FakeState>;

/// A running fake PostgREST server bound to an ephemeral local port.
pub struct FakePostgrest {
    addr: SocketAddr,
    state: Shared,
    server: Option<JoinHandle<()>>,
}

impl FakePostgrest {
    /// Start a server for [`TEST_TABLE`] accepting [`TEST_API_KEY`].
    pub async fn spawn() -> Self {
        Self::spawn_with(TEST_TABLE, TEST_API_KEY).await
    }

    /// Start a server for a specific table and key.
    pub async fn spawn_with(table: &str, api_key: &str) -> Self {
        let state = Arc::new(FakeState {
            table: table.to_string(),
            api_key: api_key.to_string(),
            rows: Mutex::new(Vec::new()),
            next_seq: AtomicU64::new(1),
            requests: AtomicUsize::new(0),
            failure: Mutex::new(None),
            forced: Mutex::new(Map::new()),
        });

        let app = Router::new()
            .route("/rest/v1/:table", get(select).post(insert).patch(update))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake PostgREST listener");
        let addr = listener.local_addr().expect("fake PostgREST address");

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!(error = %e, "Fake PostgREST stopped");
            }
        });

        Self {
            addr,
            state,
            server: Some(server),
        }
    }

    /// Base URL to hand to the client (no trailing slash).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api_key(&self) -> &str {
        &self.state.api_key
    }

    pub fn table(&self) -> &str {
        &self.state.table
    }

    /// Number of HTTP requests received so far, including rejected ones.
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Number of stored rows.
    pub fn row_count(&self) -> usize {
        self.lock_rows().len()
    }

    /// A stored row by id.
    pub fn row(&self, id: &str) -> Option<Value> {
        self.lock_rows()
            .iter()
            .find(|row| row.id() == Some(id))
            .map(|row| Value::Object(row.fields.clone()))
    }

    /// Answer every following request with this error object until
    /// [`FakePostgrest::recover`] is called.
    pub fn fail_with(&self, status: u16, code: &str, message: &str) {
        let failure = Failure {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: error_body(code, message, None),
        };
        *self.state.failure.lock().expect("failure lock") = Some(failure);
    }

    /// Stop injecting failures.
    pub fn recover(&self) {
        *self.state.failure.lock().expect("failure lock") = None;
    }

    /// Store `value` in `column` of every row inserted from now on, the way a
    /// misconfigured column default or trigger would.
    pub fn force_column(&self, column: &str, value: Value) {
        self.state
            .forced
            .lock()
            .expect("forced lock")
            .insert(column.to_string(), value);
    }

    /// Overwrite `created_at` of a stored row.
    pub fn set_created_at(&self, id: &str, created_at: &str) {
        let mut rows = self.lock_rows();
        if let Some(row) = rows.iter_mut().find(|row| row.id() == Some(id)) {
            row.fields
                .insert("created_at".to_string(), Value::String(created_at.to_string()));
        }
    }

    /// Stop the server; later requests fail to connect.
    pub async fn shutdown(mut self) {
        if let Some(server) = self.server.take() {
            server.abort();
            let _ = server.await;
        }
    }

    fn lock_rows(&self) -> std::sync::MutexGuard<'_, Vec<Row>> {
        self.state.rows.lock().expect("rows lock")
    }
}

impl Drop for FakePostgrest {
    fn drop(&mut self) {
        if let Some(server) = self.server.take() {
            server.abort();
        }
    }
}

fn error_body(code: &str, message: &str, details: Option<&str>) -> Value {
    json!({
        "code": code,
        "message": message,
        "details": details,
        "hint": null,
    })
}

fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    details: Option<&str>,
) -> Response {
    (status, Json(error_body(code, message, details))).into_response()
}

fn invalid_json() -> Response {
    error_response(StatusCode::BAD_REQUEST, "PGRST102", "Empty or invalid json", None)
}

/// Common request checks: injected failure, API key, table name.
fn admit(state: &FakeState, table: &str, headers: &HeaderMap) -> Result<(), Response> {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let failure = state.failure.lock().expect("failure lock").clone();
    if let Some(failure) = failure {
        return Err((failure.status, Json(failure.body)).into_response());
    }

    let key = headers.get("apikey").and_then(|v| v.to_str().ok());
    if key != Some(state.api_key.as_str()) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid API key" })),
        )
            .into_response());
    }

    if table != state.table {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            "42P01",
            &format!("relation \"public.{}\" does not exist", table),
            None,
        ));
    }

    Ok(())
}

fn wants_representation(headers: &HeaderMap) -> bool {
    headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("return=representation"))
}

fn wants_single(headers: &HeaderMap) -> bool {
    headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(SINGLE_OBJECT))
}

fn unknown_column(table: &str, fields: &Map<String, Value>) -> Option<Response> {
    fields
        .keys()
        .find(|key| !COLUMNS.contains(&key.as_str()))
        .map(|key| {
            error_response(
                StatusCode::BAD_REQUEST,
                "PGRST204",
                &format!("Could not find the '{}' column of '{}'", key, table),
                None,
            )
        })
}

fn id_filter(params: &HashMap<String, String>) -> Option<&str> {
    params.get("id").and_then(|v| v.strip_prefix("eq."))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

async fn insert(
    State(state): State<Shared>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = admit(&state, &table, &headers) {
        return resp;
    }

    let objects = match body {
        Value::Array(items) => items,
        other => vec![other],
    };

    // Validate everything before storing anything.
    let mut pending = Vec::with_capacity(objects.len());
    for object in objects {
        let Value::Object(mut fields) = object else {
            return invalid_json();
        };
        if let Some(resp) = unknown_column(&state.table, &fields) {
            return resp;
        }
        if let Some(column) = NOT_NULL
            .iter()
            .find(|column| fields.get(**column).map_or(true, Value::is_null))
        {
            return error_response(
                StatusCode::BAD_REQUEST,
                "23502",
                &format!(
                    "null value in column \"{}\" of relation \"{}\" violates not-null constraint",
                    column, state.table
                ),
                None,
            );
        }

        fields.insert("id".to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
        fields.insert("created_at".to_string(), Value::String(now()));
        if fields.get("status").map_or(true, Value::is_null) {
            fields.insert("status".to_string(), Value::String("new".to_string()));
        }
        for column in COLUMNS {
            fields.entry(column.to_string()).or_insert(Value::Null);
        }
        for (column, value) in state.forced.lock().expect("forced lock").iter() {
            fields.insert(column.clone(), value.clone());
        }
        pending.push(fields);
    }

    let mut created = Vec::with_capacity(pending.len());
    {
        let mut rows = state.rows.lock().expect("rows lock");
        for fields in pending {
            let seq = state.next_seq.fetch_add(1, Ordering::SeqCst);
            created.push(Value::Object(fields.clone()));
            rows.push(Row { seq, fields });
        }
    }

    if wants_representation(&headers) {
        (StatusCode::CREATED, Json(Value::Array(created))).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn select(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = admit(&state, &table, &headers) {
        return resp;
    }

    let rows = state.rows.lock().expect("rows lock");
    let id = id_filter(&params);
    let mut matched: Vec<&Row> = rows
        .iter()
        .filter(|row| id.map_or(true, |id| row.id() == Some(id)))
        .collect();

    match params.get("order").map(String::as_str) {
        Some("created_at.desc") => matched.sort_by(|a, b| {
            b.created_at()
                .cmp(a.created_at())
                .then(b.seq.cmp(&a.seq))
        }),
        Some("created_at.desc,id.desc") => matched.sort_by(|a, b| {
            b.created_at()
                .cmp(a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        }),
        _ => matched.sort_by_key(|row| row.seq),
    }

    if let Some(limit) = params.get("limit").and_then(|v| v.parse::<usize>().ok()) {
        matched.truncate(limit);
    }

    let found: Vec<Value> = matched
        .iter()
        .map(|row| Value::Object(row.fields.clone()))
        .collect();

    if wants_single(&headers) {
        if found.len() == 1 {
            return (StatusCode::OK, Json(found[0].clone())).into_response();
        }
        return error_response(
            StatusCode::NOT_ACCEPTABLE,
            "PGRST116",
            "JSON object requested, multiple (or no) rows returned",
            Some(&format!("The result contains {} rows", found.len())),
        );
    }

    (StatusCode::OK, Json(Value::Array(found))).into_response()
}

async fn update(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = admit(&state, &table, &headers) {
        return resp;
    }

    let Value::Object(patch) = body else {
        return invalid_json();
    };
    if let Some(resp) = unknown_column(&state.table, &patch) {
        return resp;
    }
    let Some(id) = id_filter(&params) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "21000",
            "UPDATE requires a WHERE clause",
            None,
        );
    };

    let mut updated = Vec::new();
    {
        let mut rows = state.rows.lock().expect("rows lock");
        for row in rows.iter_mut().filter(|row| row.id() == Some(id)) {
            for (column, value) in &patch {
                row.fields.insert(column.clone(), value.clone());
            }
            updated.push(Value::Object(row.fields.clone()));
        }
    }

    if wants_representation(&headers) {
        (StatusCode::OK, Json(Value::Array(updated))).into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}
