//! Domain DTOs for the posts API.
//!
//! # Design
//! The remote service owns the post schema, so `Post` is a transparent JSON
//! object: whatever the server sends is what a GET returns and what a PUT
//! sends back. Typed accessors cover the handful of fields this crate reads
//! or writes. `NewPost` and `PostSubmission` describe the create path, where
//! the crate does shape the payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

pub type PostId = i64;

/// Author stamped on every created post until authoring is wired up.
pub const ANONYMOUS_AUTHOR: &str = "anonymous";
pub const ANONYMOUS_EMAIL: &str = "anonymous@gmail.com";
pub const DEFAULT_CATEGORY_ID: i64 = 12;
/// Separator used to flatten the citation list into one string.
pub const CITATION_SEPARATOR: &str = ", ";

/// A post as stored by the remote service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Post(Map<String, Value>);

impl Post {
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn id(&self) -> Option<PostId> {
        self.0.get("id").and_then(Value::as_i64)
    }

    /// The post's links in stored order, exactly as stored. Empty when the
    /// field is absent or not a list.
    pub fn weblinks(&self) -> &[Value] {
        match self.0.get("weblinks") {
            Some(Value::Array(links)) => links,
            _ => &[],
        }
    }

    /// Append `link` to `weblinks`, creating the list if it is absent or null.
    ///
    /// Existing entries keep their order and duplicates are kept.
    pub fn push_weblink(&mut self, link: &str) -> Result<(), ApiError> {
        let slot = self
            .0
            .entry("weblinks")
            .or_insert_with(|| Value::Array(Vec::new()));
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(links) => {
                links.push(Value::String(link.to_string()));
                Ok(())
            }
            other => Err(ApiError::DeserializationError(format!(
                "weblinks is not a list: {other}"
            ))),
        }
    }
}

/// Caller input for creating a post: a citation list plus any other fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewPost {
    pub blogcite: Vec<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl NewPost {
    pub fn new<I, S>(blogcite: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blogcite: blogcite.into_iter().map(Into::into).collect(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

/// The record sent on create: caller fields merged with generated ones.
///
/// Generated fields win over caller fields of the same name.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostSubmission {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub did: i64,
    pub date: i64,
    pub author: String,
    pub email: String,
    pub category_id: i64,
    pub blogcite: String,
}

impl PostSubmission {
    const GENERATED_FIELDS: [&'static str; 6] =
        ["did", "date", "author", "email", "categoryId", "blogcite"];

    /// Merge `values` with generated fields stamped at `now_millis`.
    pub fn new(values: NewPost, now_millis: i64) -> Self {
        let mut fields = values.fields;
        for key in Self::GENERATED_FIELDS {
            fields.remove(key);
        }
        Self {
            fields,
            did: now_millis,
            date: now_millis,
            author: ANONYMOUS_AUTHOR.to_string(),
            email: ANONYMOUS_EMAIL.to_string(),
            category_id: DEFAULT_CATEGORY_ID,
            blogcite: values.blogcite.join(CITATION_SEPARATOR),
        }
    }
}
