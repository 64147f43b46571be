//! Async facade over the request builder and a transport.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Task, TaskId, TaskPatch};

/// The remote operations a todo front end needs.
///
/// Each call is a single best-effort round trip. Failures are always
/// returned to the caller, never swallowed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;

    async fn list_completed_tasks(&self) -> Result<Vec<Task>, ApiError>;

    async fn get_task(&self, id: TaskId) -> Result<Task, ApiError>;

    /// Create a task with `completed: false`; the server assigns id and
    /// timestamps.
    async fn create_task(&self, title: String) -> Result<Task, ApiError>;

    /// Apply the fields present in `patch` and return the updated task.
    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task, ApiError>;

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError>;
}

/// [`TodoApi`] over HTTP: build with [`TodoClient`], execute with a
/// [`Transport`], parse with [`TodoClient`].
#[derive(Debug, Clone)]
pub struct HttpTodoApi<T = ReqwestTransport> {
    client: TodoClient,
    transport: T,
}

impl HttpTodoApi<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(TodoClient::from_config(config), ReqwestTransport::new()?))
    }
}

impl<T: Transport> HttpTodoApi<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method.as_str();
        let url = request.url.clone();
        debug!(method, url = %url, "sending request");
        match self.transport.execute(request).await {
            Ok(response) => {
                if response.is_success() {
                    debug!(method, url = %url, status = response.status, "request succeeded");
                } else {
                    warn!(method, url = %url, status = response.status, "request failed");
                }
                Ok(response)
            }
            Err(err) => {
                warn!(method, url = %url, error = %err, "request not delivered");
                Err(err)
            }
        }
    }
}

#[async_trait]
impl<T: Transport> TodoApi for HttpTodoApi<T> {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let response = self.send(self.client.build_list_tasks()).await?;
        self.client.parse_list_tasks(response)
    }

    async fn list_completed_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let response = self.send(self.client.build_list_completed_tasks()).await?;
        self.client.parse_list_completed_tasks(response)
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, ApiError> {
        let response = self.send(self.client.build_get_task(id)).await?;
        self.client.parse_get_task(response)
    }

    async fn create_task(&self, title: String) -> Result<Task, ApiError> {
        let request = self.client.build_create_task(&title)?;
        let response = self.send(request).await?;
        self.client.parse_create_task(response)
    }

    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task, ApiError> {
        let request = self.client.build_update_task(id, &patch)?;
        let response = self.send(request).await?;
        self.client.parse_update_task(response)
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete_task(id)).await?;
        self.client.parse_delete_task(response)
    }
}
