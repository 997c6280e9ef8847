//! In-memory `Transport` for tests.
//!
//! `ScriptedTransport` replays queued responses in order and records every
//! request it receives, so code built on the core can be tested
//! deterministically without a server. Queue a transport failure with
//! [`ScriptedTransport::push_failure`] to simulate a dropped connection.
//!
//! ```
//! use hrms_core::mock::ScriptedTransport;
//! use hrms_core::{HrmsClient, HttpMethod};
//!
//! let transport = ScriptedTransport::new();
//! transport.push_response(204, "");
//!
//! let client = HrmsClient::new("http://localhost/api");
//! let result = client
//!     .request(&transport, HttpMethod::Delete, "employees/1/", None::<&()>)
//!     .unwrap();
//! assert!(result.is_none());
//! assert_eq!(transport.requests()[0].path, "http://localhost/api/employees/1/");
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: RefCell<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, status: u16, body: impl Into<String>) -> &Self {
        self.script
            .borrow_mut()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn push_failure(&self, reason: &str) -> &Self {
        self.script
            .borrow_mut()
            .push_back(Err(ApiError::Transport(reason.to_string())));
        self
    }

    /// Every request executed so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(request);
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response left".to_string())))
    }
}
