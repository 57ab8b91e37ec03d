//! Admin sign-in.
//!
//! The admin area is gated by a single persisted flag. Credentials are the
//! fixed demo pair; there is no server-side check.

pub mod session;

pub use session::{AdminSession, AuthError, SessionData, ADMIN_AUTH_KEY};
