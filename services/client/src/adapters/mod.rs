pub mod http;
pub mod sqlite_store;

pub use http::RestClient;
pub use sqlite_store::SqliteKeyValueStore;
