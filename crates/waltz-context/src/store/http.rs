//! HTTP layer: request building and status mapping.
//!
//! This is the ONLY place for status code handling. store/mod.rs never
//! interprets status codes.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::{ContextError, ContextResult};
use crate::types::RequestOptions;

use super::DeleteResponse;

/// Outcome of a record fetch (404 is not an error here).
#[derive(Debug)]
pub(crate) enum RecordOutcome {
    Found(String),
    NotFound,
}

/// HTTP backend for the user-context cache (holds reqwest client and endpoint).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) endpoint: Url,
}

impl HttpBackend {
    /// `GET <endpoint>?id=<user>`; 2xx => Found, 404 => NotFound.
    pub(crate) async fn fetch_record(
        &self,
        user: &str,
        options: &RequestOptions,
    ) -> ContextResult<RecordOutcome> {
        let response = self
            .request(Method::GET, options)?
            .query(&[("id", user)])
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            let text = response.text().await.map_err(|e| ContextError::Network {
                message: format!("failed to read response body: {}", e),
            })?;
            return Ok(RecordOutcome::Found(text));
        }

        if status == StatusCode::NOT_FOUND {
            debug!(user = %user, "user context not cached (404)");
            return Ok(RecordOutcome::NotFound);
        }

        Err(ContextError::Load {
            user: user.to_string(),
            status: status.as_u16(),
            status_text: status_text(status),
        })
    }

    /// `POST <endpoint>` with form `id=<user>&data=<data>`; 2xx => Ok.
    pub(crate) async fn submit_record(
        &self,
        user: &str,
        data: &str,
        options: &RequestOptions,
    ) -> ContextResult<()> {
        let response = self
            .request(Method::POST, options)?
            .form(&[("id", user), ("data", data)])
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        Err(ContextError::Save {
            user: user.to_string(),
            status: status.as_u16(),
            status_text: status_text(status),
        })
    }

    /// `POST <endpoint>` with form `id=<user>`; status is passed through.
    pub(crate) async fn submit_delete(
        &self,
        user: &str,
        options: &RequestOptions,
    ) -> ContextResult<DeleteResponse> {
        let response = self
            .request(Method::POST, options)?
            .form(&[("id", user)])
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ContextError::Network {
            message: format!("failed to read response body: {}", e),
        })?;

        Ok(DeleteResponse { status, body })
    }

    fn request(&self, method: Method, options: &RequestOptions) -> ContextResult<RequestBuilder> {
        Ok(self
            .client
            .request(method, self.endpoint.clone())
            .headers(header_map(options)?))
    }
}

fn header_map(options: &RequestOptions) -> ContextResult<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(options.headers.len());
    for (name, value) in &options.headers {
        let invalid = |message: String| ContextError::InvalidHeader {
            name: name.clone(),
            message,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}
