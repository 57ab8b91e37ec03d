//! REST client for the catalog collections.
//!
//! `ApiClient` maps each `Resource` onto four operations against
//! `<base>/<resource>`: list (GET), create (POST), update (PUT by id)
//! and delete (DELETE by id). Requests are sent once; failures bubble up
//! to the caller as `ApiError` carrying the resource name and status.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::ApiError;
