//! Data models for Pet Manager entities.
//!
//! This module contains the data structures used to represent API data:
//!
//! - `Pet`, `PetUpsert`: pet records and their create/update payload
//! - `Tutor`, `TutorUpsert`, `TutorFoto`: tutor (owner) records
//! - Page-response wrappers for the paginated list endpoints

pub mod pet;
pub mod tutor;

pub use pet::{Pet, PetUpsert, PetsPageResponse, PetsResponse};
pub use tutor::{Tutor, TutorFoto, TutorUpsert, TutoresPageResponse};
