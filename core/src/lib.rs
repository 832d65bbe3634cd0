//! Client core for the posts API.
//!
//! # Overview
//! Creates posts, appends weblinks to existing posts, and fetches one or all
//! posts from a remote posts service, returning the JSON the service sends.
//!
//! # Design
//! - `PostsClient` is stateless and I/O-free: `build_*` produces an
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - `PostsService` drives those round-trips over an injected `Transport`,
//!   resolves bearer tokens from an injected `CredentialStore`, and reports
//!   post submissions through an injected `Notifier`.
//! - `ClientConfig` carries the base URL and fallback token; nothing is read
//!   from globals.
//! - Weblink appends use the server's ETag as an `If-Match` precondition so
//!   concurrent appends to the same post are not lost.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod notify;
pub mod service;
pub mod transport;
pub mod types;

pub use client::PostsClient;
pub use config::ClientConfig;
#[cfg(feature = "keychain")]
pub use credentials::KeychainCredentialStore;
pub use credentials::{
    resolve_bearer_token, CredentialStore, EnvCredentialStore, MemoryCredentialStore,
    ACCESS_TOKEN_KEY,
};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{LogNotifier, Notification, Notifier};
pub use service::PostsService;
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{NewPost, Post, PostId, PostSubmission};
