//! Synchronous API client core for the product service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `ProductClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `ProductEditor` is a state machine over one product's draft; it reports
//!   confirmed updates and delete intents to an `EditorObserver`, usually a
//!   `ProductPage`.
//! - `Transport` is an optional blocking executor for hosts without their
//!   own HTTP stack.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod http;
pub mod page;
pub mod transport;
pub mod types;

pub use client::ProductClient;
pub use config::{ClientConfig, ConfigError};
pub use editor::{
    Completion, EditorError, EditorObserver, EditorSettings, EditorState, Notification,
    NotificationKind, PendingUpdate, ProductEditor, SubmissionTicket,
};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use page::ProductPage;
pub use transport::Transport;
pub use types::{ListQuery, Product, ProductCreate, ProductId, ProductUpdate};
