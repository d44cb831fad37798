//! REST API client module for the Pet Manager service.
//!
//! This module provides the `ApiClient` for communicating with the
//! Pet Manager API: pet and tutor CRUD, photo upload, and pet-tutor
//! linking.
//!
//! Every request to the protected API carries the session's bearer token;
//! a 401 answer triggers a single token refresh and a single retry through
//! the `SessionManager`.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
