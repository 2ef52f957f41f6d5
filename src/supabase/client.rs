//! HTTP client wrapper for the hosted database's REST gateway.

use crate::config::Config;
use crate::supabase::{
    filters::EqFilter,
    types::{ApiErrorBody, SupabaseError},
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

const RETURN_REPRESENTATION: &str = "return=representation";

/// Lightweight HTTP client for table operations (`select`, `insert`, `delete`).
///
/// Every call is a single independent statement; nothing here spans requests or opens a
/// transaction.
pub struct SupabaseService {
    pub(crate) client: Client,
    pub(crate) rest_url: String,
    pub(crate) api_key: String,
}

impl SupabaseService {
    /// Construct a client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, SupabaseError> {
        Self::with_credentials(&config.supabase_url, &config.supabase_key)
    }

    /// Construct a client for the project at `url`, authenticating with `api_key`.
    pub fn with_credentials(url: &str, api_key: &str) -> Result<Self, SupabaseError> {
        let client = Client::builder()
            .user_agent(concat!("student-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = normalize_base_url(url).map_err(SupabaseError::InvalidUrl)?;
        let rest_url = format_endpoint(&base_url, "rest/v1");
        tracing::debug!(
            url = %rest_url,
            has_api_key = !api_key.is_empty(),
            "Initialized Supabase REST client"
        );

        Ok(Self {
            client,
            rest_url,
            api_key: api_key.to_string(),
        })
    }

    /// Fetch every row of `table` in whatever order the database returns them.
    pub async fn select_all<T>(&self, table: &str) -> Result<Vec<T>, SupabaseError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, table)
            .query(&[("select", "*")])
            .send()
            .await?;
        self.read_rows(response, table, "select").await
    }

    /// Fetch the rows of `table` matching `filter`.
    pub async fn select_eq<T>(
        &self,
        table: &str,
        filter: &EqFilter,
    ) -> Result<Vec<T>, SupabaseError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, table)
            .query(&[("select", "*")])
            .query(&[filter.to_query_pair()])
            .send()
            .await?;
        self.read_rows(response, table, "select").await
    }

    /// Insert `row` into `table` and return the stored representation.
    pub async fn insert<T, R>(&self, table: &str, row: &R) -> Result<Vec<T>, SupabaseError>
    where
        T: DeserializeOwned,
        R: Serialize + ?Sized,
    {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[row])
            .send()
            .await?;
        self.read_rows(response, table, "insert").await
    }

    /// Delete the rows of `table` matching `filter`, returning what was removed.
    pub async fn delete_eq<T>(
        &self,
        table: &str,
        filter: &EqFilter,
    ) -> Result<Vec<T>, SupabaseError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::DELETE, table)
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&[filter.to_query_pair()])
            .send()
            .await?;
        self.read_rows(response, table, "delete").await
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format_endpoint(&self.rest_url, table);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn read_rows<T>(
        &self,
        response: Response,
        table: &str,
        operation: &'static str,
    ) -> Result<Vec<T>, SupabaseError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error = SupabaseError::Api {
                status,
                message: error_message(status, &body),
            };
            tracing::error!(table, operation, error = %error, "Supabase request failed");
            return Err(error);
        }

        let rows: Vec<T> = serde_json::from_str(&body).inspect_err(|err| {
            tracing::error!(table, operation, error = %err, "Supabase returned malformed rows");
        })?;
        tracing::debug!(table, operation, rows = rows.len(), "Supabase request completed");
        Ok(rows)
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(ApiErrorBody { message }) = serde_json::from_str(body) {
        return message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("empty response body")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    if parsed.cannot_be_a_base() {
        return Err(format!("{url} cannot be used as a base URL"));
    }
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
