//! Blocking HTTP client for an Ollama-compatible `/api/embeddings` endpoint.
//!
//! Sequential per-unit requests: a connect-time failure is fatal, a
//! per-unit non-2xx response is logged and the unit is simply omitted
//! from the embeddings artifact.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{DriftError, Result};

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f64>,
}

pub struct EmbeddingClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl EmbeddingClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Embed `prompt`. Connection failure is fatal; any non-2xx response
    /// is reported as a warning and yields `Ok(None)` so the caller can
    /// omit the unit without aborting the whole batch.
    pub fn embed(&self, unit_id: &str, prompt: &str) -> Result<Option<Vec<f64>>> {
        let url = format!("{}/api/embeddings", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt,
            })
            .send()
            .map_err(|source| DriftError::EmbeddingEndpointUnreachable {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            warn!(unit_id, status = %response.status(), "embedding request failed, skipping unit");
            return Ok(None);
        }

        match response.json::<EmbeddingResponse>() {
            Ok(body) => Ok(Some(body.embedding)),
            Err(e) => {
                warn!(unit_id, error = %e, "malformed embedding response, skipping unit");
                Ok(None)
            }
        }
    }
}
