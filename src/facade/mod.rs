//! View-state facades for the pet and tutor features.
//!
//! Each facade owns the observable state behind a list view (items, total,
//! loading flag, error, pagination, search term) and a detail view
//! (selected record), published on watch channels: reads are synchronous
//! via `state()`, change notification is asynchronous via `subscribe()`.
//! All persistence goes through the `ApiClient`; the facades only
//! orchestrate and translate errors into short user-facing messages.

pub mod pets;
pub mod tutores;

pub use pets::{PetFacade, PetListState};
pub use tutores::{TutorFacade, TutorListState};

use crate::api::ApiError;
use crate::auth::extract;
use crate::utils::truncate;

/// Page size used by every list view
pub(crate) const PAGE_SIZE: u32 = 10;

/// Maximum length of a user-facing error message
const MAX_MESSAGE_LENGTH: usize = 200;

/// Turn an API failure into a short user-facing message: the body's
/// `message` field first, then `error`, else the given fallback.
pub(crate) fn user_message(err: &anyhow::Error, fallback: &str) -> String {
    let body = err
        .downcast_ref::<ApiError>()
        .and_then(ApiError::body)
        .and_then(|body| serde_json::from_str(body).ok());
    match body.as_ref().and_then(extract::error_message) {
        Some(message) => truncate(&message, MAX_MESSAGE_LENGTH),
        None => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_from_body() {
        let err: anyhow::Error =
            ApiError::BadRequest(r#"{"message":"Nome é obrigatório"}"#.to_string()).into();
        assert_eq!(user_message(&err, "fallback"), "Nome é obrigatório");
    }

    #[test]
    fn test_user_message_error_field() {
        let err: anyhow::Error =
            ApiError::ServerError(r#"{"error":"instável"}"#.to_string()).into();
        assert_eq!(user_message(&err, "fallback"), "instável");
    }

    #[test]
    fn test_user_message_fallback() {
        let err: anyhow::Error = ApiError::Unauthorized.into();
        assert_eq!(user_message(&err, "Erro ao carregar pets."), "Erro ao carregar pets.");

        let unparseable: anyhow::Error = ApiError::ServerError("<html>".to_string()).into();
        assert_eq!(user_message(&unparseable, "fallback"), "fallback");
    }
}
