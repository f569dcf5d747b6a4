//! Minimal PostgREST HTTP client.
//!
//! Backend-level failures are not returned as `Err`. Like the hosted SDKs,
//! every call yields a [`PostgrestResponse`] carrying either `data` or an
//! `error` object, and callers must branch on it. Only transport and decoding
//! failures surface as [`RestError`].

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::PostgrestConfig;
use crate::error::{PostgrestError, RestError};

/// `Accept` value asking PostgREST for exactly one object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Outcome of a PostgREST call.
#[derive(Debug)]
pub struct PostgrestResponse<T> {
    pub status: StatusCode,
    pub data: Option<T>,
    pub error: Option<PostgrestError>,
}

impl<T> PostgrestResponse<T> {
    /// Convert into a `Result`, checking the error object before the data.
    ///
    /// A response without an error but also without data is a failure too.
    pub fn into_result(self) -> Result<T, RestError> {
        if let Some(error) = self.error {
            return Err(RestError::Api {
                status: self.status.as_u16(),
                error,
            });
        }

        match self.data {
            Some(data) => Ok(data),
            None => Err(RestError::EmptyBody {
                status: self.status.as_u16(),
            }),
        }
    }

    /// Whether the backend reported that a single-object request matched no rows.
    pub fn is_no_rows(&self) -> bool {
        self.error.as_ref().is_some_and(PostgrestError::is_no_rows)
    }

    /// Whether the backend could not parse a filter value for its column.
    pub fn is_invalid_text(&self) -> bool {
        self.error.as_ref().is_some_and(PostgrestError::is_invalid_text)
    }
}

/// Client for one PostgREST table.
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    http: Client,
    config: PostgrestConfig,
}

impl PostgrestClient {
    /// Build a client. No request is made.
    pub fn new(config: PostgrestConfig) -> Result<Self, RestError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RestError::Http)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &PostgrestConfig {
        &self.config
    }

    fn request(&self, method: Method, query: &[(&str, String)]) -> RequestBuilder {
        self.http
            .request(method, self.config.table_url())
            .query(query)
            .header("apikey", &self.config.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
    }

    /// Insert one row and return its representation.
    pub async fn insert<B, T>(&self, row: &B) -> Result<PostgrestResponse<Vec<T>>, RestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::POST, &[])
            .header("Prefer", "return=representation")
            .json(row);
        self.execute(builder).await
    }

    /// Select rows matching `query` (PostgREST filter syntax).
    pub async fn select<T>(
        &self,
        query: &[(&str, String)],
    ) -> Result<PostgrestResponse<Vec<T>>, RestError>
    where
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::GET, query)).await
    }

    /// Select exactly one row. Zero or several matches come back as an error
    /// object (`PGRST116`).
    pub async fn select_single<T>(
        &self,
        query: &[(&str, String)],
    ) -> Result<PostgrestResponse<T>, RestError>
    where
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::GET, query)
            .header(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));
        self.execute(builder).await
    }

    /// Patch the rows matching `query` and return their new representation.
    pub async fn update<B, T>(
        &self,
        query: &[(&str, String)],
        patch: &B,
    ) -> Result<PostgrestResponse<Vec<T>>, RestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::PATCH, query)
            .header("Prefer", "return=representation")
            .json(patch);
        self.execute(builder).await
    }

    /// Check that the table answers for this key.
    pub async fn probe(&self) -> Result<bool, RestError> {
        let query = [("select", "id".to_string()), ("limit", "1".to_string())];
        let resp = self.request(Method::GET, &query).send().await?;
        Ok(resp.status().is_success())
    }

    async fn execute<T>(&self, builder: RequestBuilder) -> Result<PostgrestResponse<T>, RestError>
    where
        T: DeserializeOwned,
    {
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "PostgREST response");

        if status.is_success() {
            let data = if body.trim().is_empty() {
                None
            } else {
                Some(serde_json::from_str(&body)?)
            };
            return Ok(PostgrestResponse {
                status,
                data,
                error: None,
            });
        }

        let error = serde_json::from_str::<PostgrestError>(&body).unwrap_or_else(|_| {
            PostgrestError {
                code: None,
                message: if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                } else {
                    body.clone()
                },
                details: None,
                hint: None,
            }
        });

        Ok(PostgrestResponse {
            status,
            data: None,
            error: Some(error),
        })
    }
}
