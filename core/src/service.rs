//! `PostsService`: the four posts operations over an injected transport.
//!
//! # Design
//! The service owns no mutable state. Each operation resolves the bearer
//! token when it needs one, runs the `PostsClient` build → transport → parse
//! round-trip, and returns a typed `ApiError` on failure. `submit_post` is the
//! one UI-facing exception: it never fails, and reports through the
//! `Notifier` instead.
//!
//! `add_weblink` is a read-modify-write. The ETag from the read is sent back
//! as `If-Match`, so a concurrent writer turns our PUT into a 412; the service
//! then re-reads and re-appends, up to `max_append_attempts` rounds.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::client::PostsClient;
use crate::config::ClientConfig;
use crate::credentials::{resolve_bearer_token, CredentialStore};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::notify::{LogNotifier, Notification, Notifier};
use crate::transport::Transport;
use crate::types::{NewPost, Post, PostId, PostSubmission};

pub struct PostsService<T, S, N = LogNotifier> {
    client: PostsClient,
    config: ClientConfig,
    transport: T,
    credentials: S,
    notifier: N,
}

impl<T, S> PostsService<T, S, LogNotifier>
where
    T: Transport,
    S: CredentialStore,
{
    pub fn new(config: ClientConfig, transport: T, credentials: S) -> Self {
        Self {
            client: PostsClient::from_config(&config),
            config,
            transport,
            credentials,
            notifier: LogNotifier,
        }
    }
}

impl<T, S, N> PostsService<T, S, N>
where
    T: Transport,
    S: CredentialStore,
    N: Notifier,
{
    pub fn with_notifier<M: Notifier>(self, notifier: M) -> PostsService<T, S, M> {
        PostsService {
            client: self.client,
            config: self.config,
            transport: self.transport,
            credentials: self.credentials,
            notifier,
        }
    }

    pub fn client(&self) -> &PostsClient {
        &self.client
    }

    pub fn bearer_token(&self) -> String {
        resolve_bearer_token(&self.credentials, &self.config.fallback_token)
    }

    /// Create a post from `values`, stamped with the current time.
    pub fn create_post(&self, values: NewPost) -> Result<Post, ApiError> {
        let token = self.bearer_token();
        let submission = PostSubmission::new(values, now_millis());
        let request = self.client.build_create_post(&submission, &token)?;
        let post = self.client.parse_create_post(self.send(request)?)?;
        Ok(post)
    }

    /// UI entry point for creating a post. Never fails: the outcome goes to
    /// the notifier, and a failure's cause is logged.
    pub fn submit_post(&self, values: NewPost) {
        match self.create_post(values) {
            Ok(post) => {
                info!(id = ?post.id(), "post created");
                self.notifier.notify(Notification::PostCreated);
            }
            Err(err) => {
                error!(error = %err, "error creating post");
                self.notifier.notify(Notification::PostFailed);
            }
        }
    }

    /// Append `weblink` to the post's `weblinks` and write the post back.
    ///
    /// Returns the post as stored after the write.
    pub fn add_weblink(&self, id: PostId, weblink: &str) -> Result<Post, ApiError> {
        let token = self.bearer_token();
        let attempts = self.config.max_append_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.append_once(id, weblink, &token) {
                Err(ApiError::Conflict) if attempt < attempts => {
                    warn!(id, attempt, "post changed during weblink append, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn append_once(&self, id: PostId, weblink: &str, token: &str) -> Result<Post, ApiError> {
        let response = self.send(self.client.build_get_post_authenticated(id, token))?;
        let etag = self.client.entity_tag(&response);
        let mut post = self.client.parse_get_post(response)?;
        post.push_weblink(weblink)?;
        info!(id, weblinks = ?post.weblinks(), "appending weblink");

        if etag.is_none() {
            warn!(id, "no ETag on post, concurrent appends may be lost");
        }
        let request = self
            .client
            .build_update_post(id, &post, token, etag.as_deref())?;
        let stored = self.client.parse_update_post(self.send(request)?)?;
        Ok(stored.unwrap_or(post))
    }

    pub fn get_post(&self, id: PostId) -> Result<Post, ApiError> {
        let post = self
            .client
            .parse_get_post(self.send(self.client.build_get_post(id))?)?;
        debug!(id, "fetched post");
        Ok(post)
    }

    /// The posts collection, passed through unmodified.
    pub fn get_posts(&self) -> Result<Value, ApiError> {
        let posts = self
            .client
            .parse_list_posts(self.send(self.client.build_list_posts())?)?;
        debug!(count = ?posts.as_array().map(Vec::len), "fetched posts");
        Ok(posts)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method.as_str();
        let path = request.path.clone();
        debug!(method, %path, "sending request");
        let response = self.transport.execute(request)?;
        debug!(method, %path, status = response.status, "received response");
        Ok(response)
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
