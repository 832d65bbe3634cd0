//! Stateless HTTP request builder and response parser for the posts API.
//!
//! # Design
//! `PostsClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! `PostsService` strings them together over a `Transport`.

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{
    HttpMethod, HttpRequest, HttpResponse, APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE, ETAG,
    IF_MATCH,
};
use crate::types::{Post, PostId, PostSubmission};

/// Synchronous, stateless client for the posts API.
#[derive(Debug, Clone)]
pub struct PostsClient {
    base_url: String,
}

impl PostsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_posts(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/posts", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_post(&self, id: PostId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/posts/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Same resource as `build_get_post`, read with the caller's credential.
    pub fn build_get_post_authenticated(&self, id: PostId, token: &str) -> HttpRequest {
        let mut request = self.build_get_post(id);
        request.headers.push(bearer(token));
        request
    }

    pub fn build_create_post(
        &self,
        submission: &PostSubmission,
        token: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(submission)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/posts", self.base_url),
            headers: vec![json_content_type(), bearer(token)],
            body: Some(body),
        })
    }

    /// Full replace of a post. `etag`, when known, is sent as `If-Match` so
    /// the server rejects the write if the post changed since it was read.
    pub fn build_update_post(
        &self,
        id: PostId,
        post: &Post,
        token: &str,
        etag: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(post).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut headers = vec![json_content_type(), bearer(token)];
        if let Some(etag) = etag {
            headers.push((IF_MATCH.to_string(), etag.to_string()));
        }
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: format!("{}/posts/{id}", self.base_url),
            headers,
            body: Some(body),
        })
    }

    /// The collection exactly as the server sent it. Its shape (plain array,
    /// paged envelope, ...) is the server's business.
    pub fn parse_list_posts(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, &[200])?;
        parse_body(&response)
    }

    pub fn parse_get_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response, &[200])?;
        parse_body(&response)
    }

    pub fn parse_create_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response, &[201, 200])?;
        parse_body(&response)
    }

    /// Returns `None` when the server acknowledges with 204 and no body.
    pub fn parse_update_post(&self, response: HttpResponse) -> Result<Option<Post>, ApiError> {
        check_status(&response, &[200, 204])?;
        if response.status == 204 || response.body.trim().is_empty() {
            return Ok(None);
        }
        parse_body(&response).map(Some)
    }

    /// The response's entity tag, if the server sent one.
    pub fn entity_tag(&self, response: &HttpResponse) -> Option<String> {
        response
            .header(ETAG)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
    }
}

fn bearer(token: &str) -> (String, String) {
    (AUTHORIZATION.to_string(), format!("Bearer {token}"))
}

fn json_content_type() -> (String, String) {
    (CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())
}

fn parse_body<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map unexpected status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    match response.status {
        404 => Err(ApiError::NotFound),
        412 => Err(ApiError::Conflict),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::NewPost;

    fn client() -> PostsClient {
        PostsClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_posts_is_unauthenticated_get() {
        let req = client().build_list_posts();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/posts");
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn build_get_post_is_unauthenticated_get() {
        let req = client().build_get_post(5);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/posts/5");
        assert!(req.header(AUTHORIZATION).is_none());
    }

    #[test]
    fn build_get_post_authenticated_adds_bearer() {
        let req = client().build_get_post_authenticated(5, "tok");
        assert_eq!(req.path, "http://localhost:3000/posts/5");
        assert_eq!(req.header(AUTHORIZATION), Some("Bearer tok"));
    }

    #[test]
    fn build_create_post_sends_submission_with_bearer() {
        let submission = PostSubmission::new(NewPost::new(["x", "y"]).with_field("title", "A"), 10);
        let req = client().build_create_post(&submission, "tok").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/posts");
        assert_eq!(req.header(CONTENT_TYPE), Some("application/json"));
        assert_eq!(req.header(AUTHORIZATION), Some("Bearer tok"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "A");
        assert_eq!(body["blogcite"], "x, y");
    }

    #[test]
    fn build_update_post_sets_if_match_when_tagged() {
        let post: Post = serde_json::from_value(json!({"id": 5, "weblinks": ["l1"]})).unwrap();
        let req = client()
            .build_update_post(5, &post, "tok", Some("\"2\""))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/posts/5");
        assert_eq!(req.header(IF_MATCH), Some("\"2\""));
        assert_eq!(req.header(AUTHORIZATION), Some("Bearer tok"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"id": 5, "weblinks": ["l1"]}));
    }

    #[test]
    fn build_update_post_without_tag_omits_if_match() {
        let req = client()
            .build_update_post(5, &Post::default(), "tok", None)
            .unwrap();
        assert!(req.header(IF_MATCH).is_none());
    }

    #[test]
    fn parse_list_posts_passes_payload_through() {
        let raw = r#"[{"id":1,"title":"T","weblinks":["a"]},{"id":2,"custom":{"x":1}}]"#;
        let posts = client().parse_list_posts(response(200, raw)).unwrap();
        let expected: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(posts, expected);
    }

    #[test]
    fn parse_list_posts_keeps_paged_envelope() {
        let raw = r#"{"_embedded":{"posts":[{"id":1}]},"page":{"size":20}}"#;
        let posts = client().parse_list_posts(response(200, raw)).unwrap();
        assert_eq!(posts, json!({"_embedded": {"posts": [{"id": 1}]}, "page": {"size": 20}}));
    }

    #[test]
    fn parse_list_posts_keeps_non_object_elements() {
        let posts = client()
            .parse_list_posts(response(200, r#"[{"id":1},"scalar",null]"#))
            .unwrap();
        assert_eq!(posts, json!([{"id": 1}, "scalar", null]));
    }

    #[test]
    fn parse_get_post_not_found() {
        let err = client().parse_get_post(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_get_post_bad_json() {
        let err = client().parse_get_post(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_create_post_accepts_201() {
        let post = client()
            .parse_create_post(response(201, r#"{"id":9,"title":"New"}"#))
            .unwrap();
        assert_eq!(post.id(), Some(9));
    }

    #[test]
    fn parse_create_post_wrong_status() {
        let err = client()
            .parse_create_post(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_update_post_conflict() {
        let err = client().parse_update_post(response(412, "")).unwrap_err();
        assert!(matches!(err, ApiError::Conflict));
    }

    #[test]
    fn parse_update_post_no_content() {
        assert!(client().parse_update_post(response(204, "")).unwrap().is_none());
    }

    #[test]
    fn entity_tag_reads_header() {
        let mut resp = response(200, "{}");
        assert_eq!(client().entity_tag(&resp), None);
        resp.headers.push(("ETag".to_string(), "\"4\"".to_string()));
        assert_eq!(client().entity_tag(&resp).as_deref(), Some("\"4\""));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = PostsClient::new("http://localhost:3000/");
        assert_eq!(client.build_list_posts().path, "http://localhost:3000/posts");
    }
}
