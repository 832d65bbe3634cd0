//! Error types for the posts API client.
//!
//! # Design
//! `NotFound` and `Conflict` get dedicated variants because callers act on
//! them: a missing post is not an outage, and a conflict means the post
//! changed between read and write. All other non-2xx responses land in
//! `HttpError` with the raw status code and body for debugging.

use thiserror::Error;

/// Errors returned by `PostsClient` and `PostsService`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 412: the post changed since it was read.
    #[error("post was modified concurrently")]
    Conflict,

    /// The server returned a status the operation does not expect.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (connection refused, DNS, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The credential store could not be read or written.
    #[error("credential store failed: {0}")]
    Credential(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
