//! Local single-document persistence.
//!
//! The whole studio data set (banners, categories, occasions,
//! advertisements) lives as one JSON document under one storage key.
//! Every load and write is checked against `STUDIO_DOCUMENT_SCHEMA`; a
//! persisted document that fails the check is replaced with the bundled
//! default.
//!
//! Several `DocumentStore` instances may share one backend (one per open
//! window). Writes are announced on a `ChangeChannel`; each subscriber
//! re-validates the announced document before adopting it. Concurrent
//! writers are not coordinated: the last write wins.

pub mod backend;
pub mod channel;
pub mod document;
pub mod error;
pub mod manager;
pub mod schema;

pub use backend::{FileStorage, MemoryStorage, StorageBackend};
pub use channel::{ChangeChannel, ChangeNotice};
pub use document::{default_document, StudioDocument};
pub use error::StoreError;
pub use manager::{Applied, DocumentStore, LoadOutcome, StoreState, STORAGE_KEY};
pub use schema::{ContainerKind, DocumentSchema, Validation, STUDIO_DOCUMENT_SCHEMA};
