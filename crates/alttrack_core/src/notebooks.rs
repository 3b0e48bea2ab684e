//! crates/alttrack_core/src/notebooks.rs
//!
//! The notebook resource store. Mediates every CRUD call against the remote
//! API and keeps the resulting collection, selection, loading flag and last
//! error in one observable snapshot.
//!
//! Calls may overlap. Each call takes a ticket from a per-field sequence when
//! it starts, and on completion only writes the fields for which its ticket is
//! still the newest:
//!
//! - `loading`/`last_error` belong to the most recently started call.
//! - `list` replaces `items` only if no other call touching `items` started
//!   after it. `create`/`update`/`delete` always apply their change to `items`.
//! - `get`/`create` set `selected` only if no later `get`, `create` or
//!   `select` happened. `update`/`delete` always fix up a matching `selected`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{CreateNotebookInput, Notebook, UpdateNotebookInput};
use crate::observable::Observable;
use crate::ports::{NotebookApi, PortResult};

//=========================================================================================
// State & Errors
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotebookState {
    /// In server order.
    pub items: Vec<Notebook>,
    /// May refer to a notebook no longer in `items`.
    pub selected: Option<Notebook>,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl NotebookState {
    pub fn has_notebooks(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn find(&self, id: Uuid) -> Option<&Notebook> {
        self.items.iter().find(|n| n.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotebookOperation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl NotebookOperation {
    fn fallback_message(self) -> &'static str {
        match self {
            NotebookOperation::List => "Failed to load notebooks",
            NotebookOperation::Get => "Failed to load notebook",
            NotebookOperation::Create => "Failed to create notebook",
            NotebookOperation::Update => "Failed to update notebook",
            NotebookOperation::Delete => "Failed to delete notebook",
        }
    }
}

/// A failed remote call, reduced to the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct NotebookError {
    pub operation: NotebookOperation,
    pub message: String,
}

//=========================================================================================
// Request Tickets
//=========================================================================================

#[derive(Default)]
struct Sequences {
    flags: AtomicU64,
    items: AtomicU64,
    selected: AtomicU64,
}

impl Sequences {
    fn issue(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(counter: &AtomicU64, ticket: u64) -> bool {
        counter.load(Ordering::SeqCst) == ticket
    }
}

#[derive(Debug, Clone, Copy)]
struct Ticket {
    flags: u64,
    items: Option<u64>,
    selected: Option<u64>,
}

//=========================================================================================
// NotebookStore
//=========================================================================================

pub struct NotebookStore {
    api: Arc<dyn NotebookApi>,
    state: Observable<NotebookState>,
    sequences: Sequences,
}

impl NotebookStore {
    pub fn new(api: Arc<dyn NotebookApi>) -> Self {
        Self {
            api,
            state: Observable::default(),
            sequences: Sequences::default(),
        }
    }

    /// `GET /notebooks`: replaces `items` with the server's list.
    pub async fn list(&self) -> Result<Vec<Notebook>, NotebookError> {
        let ticket = self.begin(true, false);
        let result = self.api.list_notebooks().await;

        self.finish(NotebookOperation::List, ticket, result, |state, notebooks, ticket| {
            if ticket.items.is_some_and(|t| Sequences::is_latest(&self.sequences.items, t)) {
                state.items = notebooks.clone();
            } else {
                debug!("Discarding superseded notebook list");
            }
        })
    }

    /// `GET /notebooks/:id`: selects the fetched notebook; `items` is untouched.
    pub async fn get(&self, id: Uuid) -> Result<Notebook, NotebookError> {
        let ticket = self.begin(false, true);
        let result = self.api.get_notebook(id).await;

        self.finish(NotebookOperation::Get, ticket, result, |state, notebook, ticket| {
            if self.selection_is_latest(ticket) {
                state.selected = Some(notebook.clone());
            }
        })
    }

    /// `POST /notebooks`: appends the created notebook and selects it.
    pub async fn create(&self, input: &CreateNotebookInput) -> Result<Notebook, NotebookError> {
        let ticket = self.begin(true, true);
        let result = self.api.create_notebook(input).await;

        self.finish(NotebookOperation::Create, ticket, result, |state, notebook, ticket| {
            // A list that completed in the meantime may already contain it.
            match state.items.iter_mut().find(|n| n.id == notebook.id) {
                Some(existing) => *existing = notebook.clone(),
                None => state.items.push(notebook.clone()),
            }
            if self.selection_is_latest(ticket) {
                state.selected = Some(notebook.clone());
            }
        })
    }

    /// `PUT /notebooks/:id`: replaces the entry in place, and the selection if it matches.
    pub async fn update(
        &self,
        id: Uuid,
        input: &UpdateNotebookInput,
    ) -> Result<Notebook, NotebookError> {
        let ticket = self.begin(true, false);
        let result = self.api.update_notebook(id, input).await;

        self.finish(NotebookOperation::Update, ticket, result, |state, notebook, _| {
            for entry in state.items.iter_mut().filter(|n| n.id == id) {
                *entry = notebook.clone();
            }
            if state.selected.as_ref().is_some_and(|s| s.id == id) {
                state.selected = Some(notebook.clone());
            }
        })
    }

    /// `DELETE /notebooks/:id`: drops the entry, and clears the selection if it matches.
    pub async fn delete(&self, id: Uuid) -> Result<(), NotebookError> {
        let ticket = self.begin(true, false);
        let result = self.api.delete_notebook(id).await;

        self.finish(NotebookOperation::Delete, ticket, result, |state, _, _| {
            state.items.retain(|n| n.id != id);
            if state.selected.as_ref().is_some_and(|s| s.id == id) {
                state.selected = None;
            }
        })
    }

    /// Local selection; no network call.
    pub fn select(&self, notebook: Option<Notebook>) {
        Sequences::issue(&self.sequences.selected);
        self.state.update(|state| state.selected = notebook);
    }

    pub fn clear_error(&self) {
        self.state.update(|state| state.last_error = None);
    }

    pub fn snapshot(&self) -> NotebookState {
        self.state.get()
    }

    pub fn has_notebooks(&self) -> bool {
        self.state.with(NotebookState::has_notebooks)
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|state| state.loading)
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.with(|state| state.last_error.clone())
    }

    pub fn selected(&self) -> Option<Notebook> {
        self.state.with(|state| state.selected.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<NotebookState> {
        self.state.subscribe()
    }

    fn selection_is_latest(&self, ticket: Ticket) -> bool {
        ticket
            .selected
            .is_some_and(|t| Sequences::is_latest(&self.sequences.selected, t))
    }

    /// Issues tickets and raises the loading flag.
    fn begin(&self, touches_items: bool, touches_selection: bool) -> Ticket {
        let ticket = Ticket {
            flags: Sequences::issue(&self.sequences.flags),
            items: touches_items.then(|| Sequences::issue(&self.sequences.items)),
            selected: touches_selection.then(|| Sequences::issue(&self.sequences.selected)),
        };
        self.state.update(|state| {
            state.loading = true;
            state.last_error = None;
        });
        ticket
    }

    /// Applies a completed call in a single state update.
    fn finish<T, F>(
        &self,
        operation: NotebookOperation,
        ticket: Ticket,
        result: PortResult<T>,
        apply: F,
    ) -> Result<T, NotebookError>
    where
        F: FnOnce(&mut NotebookState, &T, Ticket),
    {
        let owns_flags = Sequences::is_latest(&self.sequences.flags, ticket.flags);

        match result {
            Ok(value) => {
                self.state.update(|state| {
                    apply(state, &value, ticket);
                    if owns_flags {
                        state.loading = false;
                    }
                });
                Ok(value)
            }
            Err(e) => {
                let message = e
                    .server_message()
                    .unwrap_or(operation.fallback_message())
                    .to_string();
                warn!(?operation, error = %e, "Notebook request failed");
                if owns_flags {
                    self.state.update(|state| {
                        state.loading = false;
                        state.last_error = Some(message.clone());
                    });
                }
                Err(NotebookError { operation, message })
            }
        }
    }
}
