use serde::{Deserialize, Serialize};

use super::Tutor;

/// A pet record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub especie: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foto: Option<String>,
    #[serde(
        rename = "dataNascimento",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub data_nascimento: Option<String>,
    #[serde(rename = "tutorId", default, skip_serializing_if = "Option::is_none")]
    pub tutor_id: Option<i64>,
    /// Tutors linked to this pet; only populated on detail responses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tutores: Vec<Tutor>,
}

/// Create/update payload for a pet. Only presence is validated client-side;
/// business rules live on the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PetUpsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub especie: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idade: Option<String>,
    #[serde(rename = "dataNascimento", skip_serializing_if = "Option::is_none")]
    pub data_nascimento: Option<String>,
    #[serde(rename = "tutorId", skip_serializing_if = "Option::is_none")]
    pub tutor_id: Option<i64>,
}

/// Paginated response from `GET /pets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetsPageResponse {
    #[serde(default)]
    pub content: Vec<Pet>,
    #[serde(rename = "totalElements", default)]
    pub total_elements: Option<u64>,
    #[serde(rename = "totalPages", default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub number: Option<u32>,
}

/// The pets list endpoint answers with either a page object or a bare
/// array depending on the server version; both shapes are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PetsResponse {
    Page(PetsPageResponse),
    List(Vec<Pet>),
}

impl PetsResponse {
    /// Normalize to `(items, total)`, falling back to the item count when
    /// the server omits `totalElements`.
    pub fn into_page(self) -> (Vec<Pet>, u64) {
        match self {
            PetsResponse::Page(page) => {
                let total = page
                    .total_elements
                    .unwrap_or(page.content.len() as u64);
                (page.content, total)
            }
            PetsResponse::List(items) => {
                let total = items.len() as u64;
                (items, total)
            }
        }
    }
}
