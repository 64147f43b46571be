//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Executing the round-trip is the job of a [`Transport`](crate::Transport),
//! keeping this module deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{Credentials, HttpMethod, HttpRequest, HttpResponse};
use crate::types::{NewTask, Task, TaskId, TaskPatch};

const JSON: &str = "application/json";

/// Synchronous, stateless request builder and response parser.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_tasks(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/todos", None, Credentials::Omit)
    }

    pub fn build_list_completed_tasks(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/todos/completed", None, Credentials::Omit)
    }

    pub fn build_get_task(&self, id: TaskId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/todos/{id}"), None, Credentials::Omit)
    }

    pub fn build_create_task(&self, title: &str) -> Result<HttpRequest, ApiError> {
        let body = encode(&NewTask::new(title))?;
        Ok(self.request(HttpMethod::Post, "/todos", Some(body), Credentials::Omit))
    }

    pub fn build_update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<HttpRequest, ApiError> {
        let body = encode(patch)?;
        Ok(self.request(
            HttpMethod::Put,
            &format!("/todos/{id}"),
            Some(body),
            Credentials::Include,
        ))
    }

    pub fn build_delete_task(&self, id: TaskId) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            &format!("/todos/{id}"),
            None,
            Credentials::Include,
        )
    }

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_list_completed_tasks(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_get_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// The body of a successful delete is ignored.
    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        credentials: Credentials,
    ) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: vec![
                ("accept".to_string(), JSON.to_string()),
                ("content-type".to_string(), JSON.to_string()),
            ],
            body,
            credentials,
        }
    }
}

/// Reject any status outside the success range before the body is looked at.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(ApiError::Http {
            status: response.status,
        })
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}
