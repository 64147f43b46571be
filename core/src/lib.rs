//! Client core for the todo service.
//!
//! # Overview
//! Talks to a REST todo backend and keeps a local view of its tasks in sync.
//!
//! # Design
//! - `TodoClient` is stateless: `build_*` produces a plain-data request and
//!   `parse_*` consumes a plain-data response, so the I/O boundary is
//!   explicit and the wire contract is testable without a network.
//! - A `Transport` executes requests; `HttpTodoApi` glues builder,
//!   transport and parser behind the async `TodoApi` trait.
//! - `TodoView` holds the UI state and turns user actions into `Command`s
//!   whose `Outcome`s are applied back when they settle.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;
pub mod view;

pub use api::{HttpTodoApi, TodoApi};
pub use client::TodoClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError};
pub use http::{Credentials, HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{NewTask, Task, TaskId, TaskPatch, Timestamp};
pub use view::{Command, EditMode, Outcome, Sections, Status, TodoView};
