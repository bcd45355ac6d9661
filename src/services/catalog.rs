//! Vehicle catalog lookups (brands, models and descriptions by year)

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;

use crate::config::AppConfig;
use crate::services::validation::validate_year;
use crate::types::{CotizadorError, Result};

pub const INVALID_FORMAT_MESSAGE: &str = "Formato de respuesta inválido";

/// Blocking client for the catalog API
pub struct CatalogClient {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl CatalogClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.catalog_timeout())
            .build()
            .map_err(|e| CotizadorError::Http(format!("HTTP client error: {}", e)))?;

        let credentials = match (&config.catalog_user, &config.catalog_password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            (Some(user), None) => Some((user.clone(), String::new())),
            _ => None,
        };
        if credentials.is_none() {
            tracing::warn!("catalog credentials not configured; requests are unauthenticated");
        }

        Ok(Self {
            client,
            base_url: config.catalog_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Brands available for a model year
    pub fn brands(&self, year: &str) -> Result<Vec<String>> {
        validate_year(year).map_err(|e| CotizadorError::Validation(vec![e]))?;
        self.fetch("brands-by-model", &[("model", year)])
    }

    /// Models (sub-brands) of a brand
    pub fn models(&self, year: &str, brand: &str) -> Result<Vec<String>> {
        validate_year(year).map_err(|e| CotizadorError::Validation(vec![e]))?;
        self.fetch("subbrands", &[("model", year), ("brand", brand)])
    }

    /// Version descriptions of a model
    pub fn descriptions(&self, year: &str, brand: &str, model: &str) -> Result<Vec<String>> {
        validate_year(year).map_err(|e| CotizadorError::Validation(vec![e]))?;
        self.fetch(
            "description",
            &[("model", year), ("brand", brand), ("subBrand", model)],
        )
    }

    fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<String>> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, ?query, "catalog lookup");

        let response = self
            .authorize(self.client.get(&url).query(query))
            .send()
            .map_err(|e| CotizadorError::Http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CotizadorError::Http(format!(
                "Error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| CotizadorError::Parse(format!("JSON parse error: {}", e)))?;
        string_list(body)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }
}

/// A JSON array of strings; anything else is a format error
pub fn string_list(body: Value) -> Result<Vec<String>> {
    let Value::Array(items) = body else {
        return Err(CotizadorError::Parse(INVALID_FORMAT_MESSAGE.into()));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(CotizadorError::Parse(INVALID_FORMAT_MESSAGE.into())),
        })
        .collect()
}
