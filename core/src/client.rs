//! Stateless HTTP request builder and response parser for the HRMS API.
//!
//! # Design
//! `HrmsClient` holds only a `base_url` and carries no mutable state between
//! calls. Every operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! `request` glues the two together over a `Transport` for callers that do
//! not need the split.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{extract_message, ApiError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, APPLICATION_JSON, CONTENT_TYPE};
use crate::resource::Resource;
use crate::transport::Transport;
use crate::types::Attendance;

/// Synchronous, stateless client for the HRMS API.
#[derive(Debug, Clone)]
pub struct HrmsClient {
    base_url: String,
}

impl HrmsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // -----------------------------------------------------------------------
    // Generic request contract
    // -----------------------------------------------------------------------

    /// Build a request for `path` (relative to the base URL) with an optional
    /// JSON body.
    pub fn build_request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let request = HttpRequest {
            method,
            path: self.url(path),
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            body,
        };
        tracing::debug!(method = %request.method, url = %request.path, "built request");
        Ok(request)
    }

    /// Interpret any response: non-2xx becomes `ApiError::Http` with a
    /// normalized message, 204 becomes `None`, every other success is parsed
    /// as JSON (so an empty 200 is a deserialization error).
    pub fn parse_response(&self, response: HttpResponse) -> Result<Option<Value>, ApiError> {
        check_status(&response)?;
        if response.is_no_content() {
            return Ok(None);
        }
        serde_json::from_str(&response.body)
            .map(Some)
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Build, execute and parse in one step.
    pub fn request<T, B>(
        &self,
        transport: &T,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<Value>, ApiError>
    where
        T: Transport + ?Sized,
        B: Serialize + ?Sized,
    {
        let request = self.build_request(method, path, body)?;
        self.parse_response(transport.execute(request)?)
    }

    // -----------------------------------------------------------------------
    // Typed builders
    // -----------------------------------------------------------------------

    pub fn build_list<R: Resource>(&self) -> HttpRequest {
        self.bodyless(HttpMethod::Get, &collection_path::<R>())
    }

    pub fn build_create<R: Resource>(&self, input: &R::Input) -> Result<HttpRequest, ApiError> {
        self.build_request(HttpMethod::Post, &collection_path::<R>(), Some(input))
    }

    pub fn build_update<R: Resource>(
        &self,
        id: &R::Id,
        input: &R::Input,
    ) -> Result<HttpRequest, ApiError> {
        self.build_request(HttpMethod::Put, &member_path::<R>(id), Some(input))
    }

    pub fn build_delete<R: Resource>(&self, id: &R::Id) -> HttpRequest {
        self.bodyless(HttpMethod::Delete, &member_path::<R>(id))
    }

    /// Attendance history of a single employee, addressed by the employee's
    /// UUID primary key.
    pub fn build_employee_attendance(&self, employee: Uuid) -> HttpRequest {
        self.bodyless(
            HttpMethod::Get,
            &format!("{}/{employee}/", <Attendance as Resource>::COLLECTION),
        )
    }

    fn bodyless(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let request = HttpRequest {
            method,
            path: self.url(path),
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            body: None,
        };
        tracing::debug!(method = %request.method, url = %request.path, "built request");
        request
    }

    // -----------------------------------------------------------------------
    // Typed parsers
    // -----------------------------------------------------------------------

    pub fn parse_list<R: DeserializeOwned>(&self, response: HttpResponse) -> Result<Vec<R>, ApiError> {
        self.parse_entity(response)
    }

    pub fn parse_entity<R: DeserializeOwned>(&self, response: HttpResponse) -> Result<R, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// For endpoints answering 204; the body is never inspected on success.
    pub fn parse_empty(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

fn collection_path<R: Resource>() -> String {
    format!("{}/", R::COLLECTION)
}

fn member_path<R: Resource>(id: &R::Id) -> String {
    format!("{}/{id}/", R::COLLECTION)
}

/// Map non-success status codes to `ApiError::Http`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    tracing::debug!(status = response.status, "received response");
    if response.is_success() {
        return Ok(());
    }
    let message = extract_message(&response.body);
    tracing::warn!(status = response.status, %message, "request rejected");
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}
