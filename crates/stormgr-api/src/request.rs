// Request and result types for the gateway.
//
// A `Request` is a plain description of one HTTP call: method, path,
// body with its encoding, query parameters, and headers. The gateway
// turns it into a reqwest call; nothing here touches the network.

use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::warn;

use crate::error::Error;

/// The five HTTP verbs the management API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    /// Parse a verb, rejecting anything outside the supported five.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Self::from_str(raw.trim()).map_err(|_| Error::UnsupportedMethod(raw.to_owned()))
    }

    /// Whether this verb carries a request body.
    pub fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Request body together with its wire encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// `application/json`, arbitrary nesting.
    Json(Value),
    /// `application/x-www-form-urlencoded` (login only, in practice).
    Form(Vec<(String, String)>),
}

/// A query parameter value. `Many` repeats the key once per element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        Self::One(v.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        Self::One(v)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(v: Vec<String>) -> Self {
        Self::Many(v)
    }
}

impl From<&[&str]> for QueryValue {
    fn from(v: &[&str]) -> Self {
        Self::Many(v.iter().map(|s| (*s).to_owned()).collect())
    }
}

/// One call to the management API.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Relative to the session's REST base URL, or absolute.
    pub path: String,
    pub body: Option<Body>,
    pub query: Vec<(String, QueryValue)>,
    pub headers: Vec<(String, String)>,
    /// Skip the response formatter on successful GETs.
    pub raw: bool,
    pub(crate) login: bool,
    pub(crate) retry_after_login: bool,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            headers: Vec::new(),
            raw: false,
            login: false,
            retry_after_login: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// The form-encoded credential POST sent to the login URL.
    pub(crate) fn login(url: String, fields: Vec<(String, String)>) -> Self {
        let mut req = Self::post(url).form(fields);
        req.login = true;
        req
    }

    /// JSON body. Ignored for verbs that carry no body.
    pub fn json(mut self, body: impl Serialize) -> Self {
        // Only maps with non-string keys fail to convert.
        self.body = match serde_json::to_value(body) {
            Ok(value) => Some(Body::Json(value)),
            Err(e) => {
                warn!(path = %self.path, error = %e, "request body is not representable as JSON; sending none");
                None
            }
        };
        self
    }

    pub fn json_value(mut self, body: Option<Value>) -> Self {
        self.body = body.map(Body::Json);
        self
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(Body::Form(fields));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn queries(mut self, params: impl IntoIterator<Item = (String, QueryValue)>) -> Self {
        self.query.extend(params);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Request the unformatted GET result.
    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    pub fn is_login(&self) -> bool {
        self.login
    }

    pub fn is_retry_after_login(&self) -> bool {
        self.retry_after_login
    }

    /// Copy of this request flagged as the one post-login retry.
    pub(crate) fn as_retry(&self) -> Self {
        let mut retry = self.clone();
        retry.retry_after_login = true;
        retry
    }
}

/// Outcome of one gateway call.
///
/// `Deleted` is the boolean short-circuit some DELETE endpoints answer
/// with (HTTP 204, no task); everything else is a JSON document, `Null`
/// for an empty body.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    Document(Value),
    Deleted,
}

impl RawResult {
    /// The document, or `true` for the DELETE short-circuit.
    pub fn into_value(self) -> Value {
        match self {
            Self::Document(v) => v,
            Self::Deleted => Value::Bool(true),
        }
    }

    pub fn as_document(&self) -> Option<&Value> {
        match self {
            Self::Document(v) => Some(v),
            Self::Deleted => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(Method::parse("get").ok(), Some(Method::Get));
        assert_eq!(Method::parse("Patch").ok(), Some(Method::Patch));
        assert_eq!(Method::parse(" DELETE ").ok(), Some(Method::Delete));
    }

    #[test]
    fn method_parse_rejects_other_verbs() {
        assert!(matches!(
            Method::parse("HEAD"),
            Err(Error::UnsupportedMethod(ref m)) if m == "HEAD"
        ));
    }

    #[test]
    fn method_display_is_uppercase() {
        assert_eq!(Method::Put.to_string(), "PUT");
    }

    #[test]
    fn retry_copy_carries_flag() {
        let req = Request::get("shares").raw();
        let retry = req.as_retry();
        assert!(retry.is_retry_after_login());
        assert!(!req.is_retry_after_login());
        assert!(retry.raw);
    }

    #[test]
    fn unrepresentable_json_body_is_dropped() {
        let mut body = std::collections::BTreeMap::new();
        body.insert((1, 2), "pair key");
        let req = Request::post("shares").json(body);
        assert_eq!(req.body, None);

        let req = Request::post("shares").json(serde_json::json!({"name": "home"}));
        assert!(matches!(req.body, Some(Body::Json(_))));
    }

    #[test]
    fn deleted_result_reads_as_true() {
        assert_eq!(RawResult::Deleted.into_value(), Value::Bool(true));
    }
}
