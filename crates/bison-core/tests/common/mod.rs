//! Shared test doubles
#![allow(dead_code)]

use async_trait::async_trait;
use bison_core::clients::{ApiRequest, ApiTransport, HttpMethod};
use bison_core::error::{BisonError, Result};
use bison_core::params::StaticParameters;
use serde_json::Value;
use std::sync::Mutex;

enum Reply {
    Body(Value),
    Failure { status: u16, message: String },
}

struct Route {
    method: HttpMethod,
    path: String,
    query: Option<(String, String)>,
    reply: Reply,
}

impl Route {
    fn matches(&self, request: &ApiRequest) -> bool {
        self.method == request.method
            && self.path == request.path
            && self
                .query
                .as_ref()
                .map(|(k, v)| request.query_value(k) == Some(v.as_str()))
                .unwrap_or(true)
    }
}

/// Scripted transport: answers by method and path, records every request
#[derive(Default)]
pub struct MockTransport {
    routes: Vec<Route>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, method: HttpMethod, path: &str, body: Value) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            query: None,
            reply: Reply::Body(body),
        });
        self
    }

    /// Response for one `page` of a list endpoint
    pub fn with_page(mut self, path: &str, page: u32, body: Value) -> Self {
        self.routes.push(Route {
            method: HttpMethod::Get,
            path: path.to_string(),
            query: Some(("page".to_string(), page.to_string())),
            reply: Reply::Body(body),
        });
        self
    }

    pub fn with_failure(
        mut self,
        method: HttpMethod,
        path: &str,
        status: u16,
        message: &str,
    ) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            query: None,
            reply: Reply::Failure {
                status,
                message: message.to_string(),
            },
        });
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `"METHOD path"` of every request, in order
    pub fn calls(&self) -> Vec<String> {
        self.requests().iter().map(|r| r.to_string()).collect()
    }

    pub fn body_of(&self, index: usize) -> Value {
        self.requests()[index].body.clone().unwrap_or(Value::Null)
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());

        match self.routes.iter().find(|route| route.matches(&request)) {
            Some(Route { reply: Reply::Body(body), .. }) => Ok(body.clone()),
            Some(Route {
                reply: Reply::Failure { status, message },
                ..
            }) => Err(BisonError::Upstream {
                status: *status,
                message: message.clone(),
            }),
            None => Err(BisonError::Upstream {
                status: 404,
                message: format!("no route for {}", request),
            }),
        }
    }
}

pub fn params(value: Value) -> StaticParameters {
    StaticParameters::from_value(value)
}
