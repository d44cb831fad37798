//! PetRack core - a client library for the Pet Manager REST API.
//!
//! This crate owns everything below the UI of a pet/tutor management
//! front-end:
//!
//! - `auth`: session and token lifecycle (login, silent refresh, logout)
//! - `api`: authenticated HTTP client with 401 refresh-and-retry
//! - `models`: pet and tutor data types
//! - `facade`: observable list/detail state with pagination and search
//! - `notify`: toast notification channel
//!
//! Consumers subscribe to the watch/broadcast channels exposed here and
//! render however they like; no rendering code lives in this crate.

pub mod api;
pub mod auth;
pub mod config;
pub mod facade;
pub mod models;
pub mod notify;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthState, LoginOutcome, SessionData, SessionEvent, SessionManager, SessionStore};
pub use config::Config;
pub use facade::{PetFacade, PetListState, TutorFacade, TutorListState};
pub use models::{Pet, PetUpsert, PetsResponse, Tutor, TutorUpsert};
pub use notify::{Notifier, ToastKind, ToastState};
