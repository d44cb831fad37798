//! API client for communicating with the Pet Manager REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests: pet and tutor CRUD, list pagination and search, photo upload,
//! and pet-tutor linking.
//!
//! Every outbound request attaches the session's bearer token when one is
//! present. A 401 answer on a request that is eligible for refresh (a
//! refresh token exists, and the request is not the login/refresh call
//! itself - those never pass through here) triggers exactly one token
//! refresh and exactly one retry with the new token; anything else fails
//! closed by logging the session out and propagating the original error.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{multipart, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::SessionManager;
use crate::config::Config;
use crate::models::{Pet, PetUpsert, PetsResponse, Tutor, TutorUpsert, TutoresPageResponse};

use super::endpoints;
use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the Pet Manager service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    auth: Arc<SessionManager>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &Config, auth: Arc<SessionManager>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            auth,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send an authenticated request, applying the 401 refresh-and-retry
    /// policy. The builder closure is invoked once per attempt so request
    /// bodies (including multipart forms) can be rebuilt for the retry.
    async fn send_with_auth<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn(&Client) -> reqwest::RequestBuilder,
    {
        let request = |token: Option<String>| {
            let mut builder = build(&self.http);
            if let Some(token) = token {
                builder = builder.bearer_auth(token);
            }
            builder
        };

        let response = request(self.auth.token())
            .send()
            .await
            .map_err(ApiError::from)?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check_response(response).await;
        }

        if self.auth.has_refresh_token() {
            if let Some(new_token) = self.auth.refresh_token().await {
                debug!("Retrying request with refreshed token");
                let retried = request(Some(new_token))
                    .send()
                    .await
                    .map_err(ApiError::from)?;
                return Self::check_response(retried).await;
            }
            // Refresh yielded nothing; the manager already failed closed,
            // but logout is idempotent and the contract is explicit
        }
        self.auth.logout();
        Err(ApiError::Unauthorized.into())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send_with_auth(|http| http.get(url)).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        let response = self
            .send_with_auth(|http| http.post(url).json(body))
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn put_json<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        let response = self
            .send_with_auth(|http| http.put(url).json(body))
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// List query parameters; `nome` is only sent when non-empty.
    fn list_params(page: u32, size: u32, nome: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", page.to_string()), ("size", size.to_string())];
        if let Some(nome) = nome.map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("nome", nome.to_string()));
        }
        params
    }

    // ===== Pets =====

    /// Fetch a page of pets, optionally filtered by name. The server
    /// answers with either a page object or a bare array; both come back
    /// as `PetsResponse`.
    pub async fn fetch_pets(
        &self,
        page: u32,
        size: u32,
        nome: Option<&str>,
    ) -> Result<PetsResponse> {
        let url = self.url(endpoints::PETS);
        let params = Self::list_params(page, size, nome);
        let response = self
            .send_with_auth(|http| http.get(&url).query(&params))
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse pets response from {}", url))
    }

    pub async fn fetch_pet(&self, id: i64) -> Result<Pet> {
        let url = format!("{}/{}", self.url(endpoints::PETS), id);
        self.get_json(&url).await
    }

    pub async fn create_pet(&self, body: &PetUpsert) -> Result<Pet> {
        let url = self.url(endpoints::PETS);
        self.post_json(&url, body).await
    }

    pub async fn update_pet(&self, id: i64, body: &PetUpsert) -> Result<Pet> {
        let url = format!("{}/{}", self.url(endpoints::PETS), id);
        self.put_json(&url, body).await
    }

    pub async fn delete_pet(&self, id: i64) -> Result<()> {
        let url = format!("{}/{}", self.url(endpoints::PETS), id);
        self.send_with_auth(|http| http.delete(&url)).await?;
        Ok(())
    }

    /// Upload a pet photo as multipart form data (field `foto`).
    pub async fn upload_pet_photo(
        &self,
        id: i64,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let url = format!("{}/{}/foto", self.url(endpoints::PETS), id);
        self.send_with_auth(|http| {
            let part = multipart::Part::bytes(bytes.clone()).file_name(file_name.to_string());
            // Fall back to an untyped part on an unparseable content type;
            // the server sniffs the payload anyway
            let part = match part.mime_str(content_type) {
                Ok(part) => part,
                Err(_) => multipart::Part::bytes(bytes.clone()).file_name(file_name.to_string()),
            };
            http.post(&url)
                .multipart(multipart::Form::new().part("foto", part))
        })
        .await?;
        Ok(())
    }

    // ===== Tutors =====

    /// Fetch a page of tutors, optionally filtered by name.
    pub async fn fetch_tutores(
        &self,
        page: u32,
        size: u32,
        nome: Option<&str>,
    ) -> Result<TutoresPageResponse> {
        let url = self.url(endpoints::TUTORES);
        let params = Self::list_params(page, size, nome);
        let response = self
            .send_with_auth(|http| http.get(&url).query(&params))
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse tutors response from {}", url))
    }

    pub async fn fetch_tutor(&self, id: i64) -> Result<Tutor> {
        let url = format!("{}/{}", self.url(endpoints::TUTORES), id);
        self.get_json(&url).await
    }

    pub async fn create_tutor(&self, body: &TutorUpsert) -> Result<Tutor> {
        let url = self.url(endpoints::TUTORES);
        self.post_json(&url, body).await
    }

    pub async fn update_tutor(&self, id: i64, body: &TutorUpsert) -> Result<Tutor> {
        let url = format!("{}/{}", self.url(endpoints::TUTORES), id);
        self.put_json(&url, body).await
    }

    pub async fn delete_tutor(&self, id: i64) -> Result<()> {
        let url = format!("{}/{}", self.url(endpoints::TUTORES), id);
        self.send_with_auth(|http| http.delete(&url)).await?;
        Ok(())
    }

    /// Pets currently linked to a tutor.
    pub async fn fetch_tutor_pets(&self, tutor_id: i64) -> Result<Vec<Pet>> {
        let url = format!("{}/{}/pets", self.url(endpoints::TUTORES), tutor_id);
        self.get_json(&url).await
    }

    pub async fn link_pet(&self, tutor_id: i64, pet_id: i64) -> Result<()> {
        let url = format!(
            "{}/{}/pets/{}",
            self.url(endpoints::TUTORES),
            tutor_id,
            pet_id
        );
        self.send_with_auth(|http| http.put(&url)).await?;
        Ok(())
    }

    pub async fn unlink_pet(&self, tutor_id: i64, pet_id: i64) -> Result<()> {
        let url = format!(
            "{}/{}/pets/{}",
            self.url(endpoints::TUTORES),
            tutor_id,
            pet_id
        );
        self.send_with_auth(|http| http.delete(&url)).await?;
        Ok(())
    }
}
