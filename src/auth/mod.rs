//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionData`/`SessionStore`: the token pair + expiry, persisted to
//!   disk so the session survives restarts
//! - `extract`: ordered extraction rules for the API's variable login and
//!   refresh response shapes
//! - `SessionManager`: login, silent refresh scheduling, single-flight
//!   refresh de-duplication, and logout
//!
//! The session fails closed: any ambiguity resolves to the logged-out
//! state.

pub mod extract;
pub mod manager;
pub mod session;

pub use manager::{AuthState, LoginOutcome, SessionEvent, SessionManager};
pub use session::{SessionData, SessionStore};
