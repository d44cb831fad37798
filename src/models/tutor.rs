use serde::{Deserialize, Serialize};

/// Photo attachment on a tutor record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorFoto {
    pub id: i64,
    pub nome: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub url: String,
}

/// A tutor (pet owner) record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tutor {
    pub id: i64,
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endereco: Option<String>,
    /// CPF as the API stores it: a bare number, no mask.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foto: Option<TutorFoto>,
}

/// Create/update payload for a tutor.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TutorUpsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endereco: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<i64>,
}

/// Paginated response from `GET /tutores`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutoresPageResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "pageCount", default)]
    pub page_count: u32,
    #[serde(default)]
    pub content: Vec<Tutor>,
}
