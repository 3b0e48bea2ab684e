//! A throwaway REST backend shared by the integration tests.
#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const PASSWORD: &str = "secret";
pub const USER_ID: &str = "7d4f2c1e-93b5-4f0a-b6a8-2c9e1d0f5a31";

type Reply = (StatusCode, Json<Value>);

#[derive(Clone)]
pub struct MockBackend {
    pub token: String,
    pub notebooks: Arc<Mutex<Vec<Value>>>,
    pub seen_authorization: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockBackend {
    pub fn new(token: String) -> Self {
        Self {
            token,
            notebooks: Arc::new(Mutex::new(Vec::new())),
            seen_authorization: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Reply> {
        let header = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen_authorization.lock().unwrap().push(header.clone());
        if header.as_deref() == Some(format!("Bearer {}", self.token).as_str()) {
            Ok(())
        } else {
            Err(reply(StatusCode::UNAUTHORIZED, json!({ "message": "Unauthorized" })))
        }
    }
}

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

/// Builds an unsigned JWT-shaped token carrying `claims`.
pub fn token_with(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}

pub fn fresh_token() -> String {
    token_with(json!({
        "sub": USER_ID,
        "environment": "development",
        "exp": chrono::Utc::now().timestamp() + 3600,
    }))
}

pub fn notebook_json(name: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "name": name,
        "startDate": "2025-09-01T00:00:00.000Z",
        "locationZone": "A",
        "weekPatternJson": ["SCHOOL", "SCHOOL", "COMPANY", "COMPANY", "COMPANY", "OFF", "OFF"],
        "userId": USER_ID,
        "createdAt": "2025-08-20T10:00:00.000Z",
        "updatedAt": "2025-08-20T10:00:00.000Z",
    })
}

async fn login(State(backend): State<MockBackend>, Json(body): Json<Value>) -> Reply {
    if body["password"] != PASSWORD {
        return reply(StatusCode::UNAUTHORIZED, json!({ "message": "Unauthorized" }));
    }
    reply(
        StatusCode::OK,
        json!({
            "accessToken": backend.token,
            "user": { "id": USER_ID, "username": body["username"], "role": "USER" },
        }),
    )
}

async fn register(Json(body): Json<Value>) -> Reply {
    match body["username"].as_str() {
        Some("taken") => reply(
            StatusCode::CONFLICT,
            json!({ "message": "Username already exists" }),
        ),
        Some(name) if name.len() < 3 => reply(
            StatusCode::BAD_REQUEST,
            json!({ "message": ["username must be longer than or equal to 3 characters"] }),
        ),
        _ => reply(
            StatusCode::CREATED,
            json!({
                "id": Uuid::new_v4(),
                "username": body["username"],
                "role": "USER",
                "createdAt": "2025-08-20T10:00:00.000Z",
            }),
        ),
    }
}

async fn list_notebooks(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, Reply> {
    backend.authorize(&headers)?;
    Ok(Json(backend.notebooks.lock().unwrap().clone()))
}

fn not_found() -> Reply {
    reply(StatusCode::NOT_FOUND, json!({ "message": "Notebook not found" }))
}

async fn get_notebook(
    State(backend): State<MockBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, Reply> {
    backend.authorize(&headers)?;
    let rows = backend.notebooks.lock().unwrap();
    rows.iter()
        .find(|row| row["id"] == id.as_str())
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn create_notebook(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Result<Reply, Reply> {
    backend.authorize(&headers)?;
    let name = input["name"].as_str().unwrap_or_default();
    let mut row = notebook_json(name);
    let start_date = input["startDate"].as_str().unwrap_or_default();
    row["startDate"] = json!(format!("{}T00:00:00.000Z", start_date));
    row["locationZone"] = input["locationZone"].clone();
    row["weekPatternJson"] = input["weekPatternJson"].clone();
    backend.notebooks.lock().unwrap().push(row.clone());
    Ok(reply(StatusCode::CREATED, row))
}

async fn update_notebook(
    State(backend): State<MockBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Result<Json<Value>, Reply> {
    backend.authorize(&headers)?;
    let mut rows = backend.notebooks.lock().unwrap();
    let row = rows
        .iter_mut()
        .find(|row| row["id"] == id.as_str())
        .ok_or_else(not_found)?;
    if let Some(fields) = input.as_object() {
        for (key, value) in fields {
            row[key] = value.clone();
        }
    }
    Ok(Json(row.clone()))
}

async fn delete_notebook(
    State(backend): State<MockBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, Reply> {
    backend.authorize(&headers)?;
    let mut rows = backend.notebooks.lock().unwrap();
    let before = rows.len();
    rows.retain(|row| row["id"] != id.as_str());
    if rows.len() == before {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// An upstream failure with an HTML body, as a proxy would send it.
pub async fn broken_gateway() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>")
}

pub fn router(backend: MockBackend) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/notebooks", get(list_notebooks).post(create_notebook))
        .route(
            "/notebooks/{id}",
            get(get_notebook).put(update_notebook).delete(delete_notebook),
        )
        .with_state(backend)
}

/// Serves the mock on an ephemeral port and returns its base URL.
pub async fn spawn(backend: MockBackend) -> String {
    serve(router(backend)).await
}

pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL on which nothing is listening.
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
