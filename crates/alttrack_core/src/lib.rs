pub mod domain;
pub mod notebooks;
pub mod observable;
pub mod ports;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod token;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use domain::{
    AuthSession, CreateNotebookInput, DayType, Identity, Notebook, UpdateNotebookInput, WeekPattern,
};
pub use notebooks::{NotebookError, NotebookState, NotebookStore};
pub use observable::Observable;
pub use ports::{
    AccessTokenSource, AuthApi, KeyValueStore, NotebookApi, PortError, PortResult, StorageWrite,
};
pub use preferences::{Theme, ThemeStore};
pub use session::{AuthError, RegisterError, SessionStore};
pub use storage::MemoryStore;
pub use token::{TokenCodec, TokenPayload};
pub use validation::ValidationError;
