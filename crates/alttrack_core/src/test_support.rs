//! Scripted port implementations shared by the store tests.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::domain::{
    CreateNotebookInput, Credentials, Identity, LocationZone, LoginResponse, Notebook,
    RegisterResponse, Role, UpdateNotebookInput, WeekPattern,
};
use crate::ports::{AuthApi, KeyValueStore, NotebookApi, PortError, PortResult, StorageWrite};

pub fn token_for(environment: &str, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = json!({ "exp": exp, "environment": environment }).to_string();
    format!("{header}.{}.sig", URL_SAFE_NO_PAD.encode(claims))
}

pub fn identity(username: &str) -> Identity {
    Identity {
        id: Uuid::new_v4(),
        username: username.to_string(),
        role: Role::User,
    }
}

pub fn notebook(name: &str) -> Notebook {
    let at = Utc.with_ymd_and_hms(2024, 9, 2, 0, 0, 0).unwrap();
    Notebook {
        id: Uuid::new_v4(),
        name: name.to_string(),
        start_date: at,
        end_date: None,
        duration_in_weeks: Some(52),
        location_zone: LocationZone::A,
        week_pattern: WeekPattern::default(),
        owner_id: Uuid::new_v4(),
        special_rules: Vec::new(),
        overrides: Vec::new(),
        special_periods: Vec::new(),
        created_at: at,
        updated_at: at,
    }
}

pub fn http_error(status: u16, message: Option<&str>) -> PortError {
    PortError::Http {
        status,
        message: message.map(str::to_string),
    }
}

fn gate_dropped() -> PortError {
    PortError::Unreachable("gate dropped".into())
}

//=========================================================================================
// Auth
//=========================================================================================

/// Replies to every login/register with the queued results, in order.
#[derive(Default)]
pub struct ScriptedAuthApi {
    logins: Mutex<VecDeque<PortResult<LoginResponse>>>,
    registrations: Mutex<VecDeque<PortResult<RegisterResponse>>>,
    pub calls: AtomicUsize,
}

impl ScriptedAuthApi {
    pub fn with_login(result: PortResult<LoginResponse>) -> Self {
        let api = Self::default();
        api.logins.lock().unwrap().push_back(result);
        api
    }

    pub fn with_registration(result: PortResult<RegisterResponse>) -> Self {
        let api = Self::default();
        api.registrations.lock().unwrap().push_back(result);
        api
    }
}

#[async_trait]
impl AuthApi for ScriptedAuthApi {
    async fn login(&self, _credentials: &Credentials) -> PortResult<LoginResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.logins
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PortError::Unreachable("no scripted login".into())))
    }

    async fn register(&self, _credentials: &Credentials) -> PortResult<RegisterResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.registrations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PortError::Unreachable("no scripted registration".into())))
    }
}

//=========================================================================================
// Notebooks
//=========================================================================================

/// A tiny in-memory backend.
#[derive(Default)]
pub struct InMemoryNotebookApi {
    pub rows: Mutex<Vec<Notebook>>,
    pub fail_with: Mutex<Option<PortError>>,
}

impl InMemoryNotebookApi {
    pub fn seeded(rows: Vec<Notebook>) -> Self {
        Self {
            rows: Mutex::new(rows),
            fail_with: Mutex::new(None),
        }
    }

    pub fn fail_next(&self, error: PortError) {
        *self.fail_with.lock().unwrap() = Some(error);
    }

    fn check(&self) -> PortResult<()> {
        match self.fail_with.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NotebookApi for InMemoryNotebookApi {
    async fn list_notebooks(&self) -> PortResult<Vec<Notebook>> {
        self.check()?;
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn get_notebook(&self, id: Uuid) -> PortResult<Notebook> {
        self.check()?;
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| http_error(404, Some("Notebook not found")))
    }

    async fn create_notebook(&self, input: &CreateNotebookInput) -> PortResult<Notebook> {
        self.check()?;
        let mut created = notebook(&input.name);
        created.location_zone = input.location_zone;
        created.week_pattern = input.week_pattern;
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_notebook(&self, id: Uuid, input: &UpdateNotebookInput) -> PortResult<Notebook> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| http_error(404, Some("Notebook not found")))?;
        if let Some(name) = &input.name {
            row.name = name.clone();
        }
        if let Some(pattern) = input.week_pattern {
            row.week_pattern = pattern;
        }
        Ok(row.clone())
    }

    async fn delete_notebook(&self, id: Uuid) -> PortResult<()> {
        self.check()?;
        self.rows.lock().unwrap().retain(|n| n.id != id);
        Ok(())
    }
}

/// Each `list_notebooks` call waits for the next queued reply channel.
#[derive(Default)]
pub struct GatedNotebookApi {
    lists: Mutex<VecDeque<oneshot::Receiver<PortResult<Vec<Notebook>>>>>,
    gets: Mutex<VecDeque<oneshot::Receiver<PortResult<Notebook>>>>,
}

impl GatedNotebookApi {
    pub fn gate_list(&self) -> oneshot::Sender<PortResult<Vec<Notebook>>> {
        let (tx, rx) = oneshot::channel();
        self.lists.lock().unwrap().push_back(rx);
        tx
    }

    pub fn gate_get(&self) -> oneshot::Sender<PortResult<Notebook>> {
        let (tx, rx) = oneshot::channel();
        self.gets.lock().unwrap().push_back(rx);
        tx
    }
}

#[async_trait]
impl NotebookApi for GatedNotebookApi {
    async fn list_notebooks(&self) -> PortResult<Vec<Notebook>> {
        let gate = self.lists.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(gate_dropped())),
            None => Ok(Vec::new()),
        }
    }

    async fn get_notebook(&self, _id: Uuid) -> PortResult<Notebook> {
        let gate = self.gets.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(gate_dropped())),
            None => Err(http_error(404, None)),
        }
    }

    async fn create_notebook(&self, input: &CreateNotebookInput) -> PortResult<Notebook> {
        Ok(notebook(&input.name))
    }

    async fn update_notebook(
        &self,
        _id: Uuid,
        _input: &UpdateNotebookInput,
    ) -> PortResult<Notebook> {
        Err(http_error(404, None))
    }

    async fn delete_notebook(&self, _id: Uuid) -> PortResult<()> {
        Ok(())
    }
}

//=========================================================================================
// Storage
//=========================================================================================

/// Reads succeed with nothing stored, every write fails.
pub struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> PortResult<Option<String>> {
        Ok(None)
    }

    async fn apply(&self, _writes: &[StorageWrite]) -> PortResult<()> {
        Err(PortError::Storage("disk full".into()))
    }
}
