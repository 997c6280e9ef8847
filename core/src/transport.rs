//! Executing `HttpRequest`s.
//!
//! # Design
//! The core never opens sockets itself; anything that can turn an
//! `HttpRequest` into an `HttpResponse` can drive it. Status codes are data:
//! a transport returns `Err` only when the round-trip did not complete.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one HTTP round-trip. No retries, no timeouts, no caching.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use ureq::Agent;

    use super::Transport;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by a ureq agent.
    ///
    /// ureq's status-as-error behaviour is disabled so 4xx/5xx responses come
    /// back as data and the client can normalize their bodies.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: Agent,
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
            let content_type = req
                .headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
                .map_or("application/json", |(_, value)| value.as_str());

            let result = match (req.method, req.body) {
                (HttpMethod::Get, _) => agent_call(self.agent.get(&req.path), &req.headers),
                (HttpMethod::Delete, _) => agent_call(self.agent.delete(&req.path), &req.headers),
                (HttpMethod::Post, Some(body)) => self
                    .agent
                    .post(&req.path)
                    .content_type(content_type)
                    .send(body.as_bytes()),
                (HttpMethod::Post, None) => self.agent.post(&req.path).send_empty(),
                (HttpMethod::Put, Some(body)) => self
                    .agent
                    .put(&req.path)
                    .content_type(content_type)
                    .send(body.as_bytes()),
                (HttpMethod::Put, None) => self.agent.put(&req.path).send_empty(),
            };

            let mut response = result.map_err(|e| {
                tracing::warn!(method = %req.method, url = %req.path, error = %e, "transport failed");
                ApiError::Transport(e.to_string())
            })?;

            let status = response.status().as_u16();
            // A 204 has no body to read. Anything else must arrive whole.
            let body = match response.body_mut().read_to_string() {
                Ok(body) => body,
                Err(_) if status == 204 => String::new(),
                Err(e) => {
                    tracing::warn!(method = %req.method, url = %req.path, status, error = %e, "reading response body failed");
                    return Err(ApiError::Transport(e.to_string()));
                }
            };

            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body,
            })
        }
    }

    fn agent_call(
        mut builder: ureq::RequestBuilder<ureq::typestate::WithoutBody>,
        headers: &[(String, String)],
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.call()
    }
}
