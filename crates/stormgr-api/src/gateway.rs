// Request gateway
//
// Executes one `Request` against a session: URL resolution, query and
// body encoding, status handling, and the single bounded re-login when
// an authenticated session is rejected with 401. Successful GETs are
// passed through the response formatter unless the caller asked for raw
// output.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::formatter;
use crate::request::{Body, Method, QueryValue, RawResult, Request};
use crate::session::Session;

/// JSON pointers tried, in order, for a human-readable error message.
const ERROR_MESSAGE_POINTERS: &[&str] = &[
    "/message",
    "/errorMessage",
    "/error/message",
    "/error",
    "/detail",
    "/errors/0/message",
];

impl Session {
    /// Issue one call, logging in first when the session needs it.
    ///
    /// A 401 on an authenticated call invalidates the session, logs in
    /// once, and re-sends the request flagged as the post-login retry.
    /// A second 401 is an authentication failure.
    pub async fn invoke(&self, request: Request) -> Result<RawResult, Error> {
        self.ensure_authenticated(&request).await?;

        match self.execute(&request).await {
            Err(e) if e.is_auth_expired() && self.can_retry_after_login(&request) => {
                warn!(path = %request.path, "session rejected by server; logging in again");
                self.invalidate();
                self.login().await?;

                let retry = request.as_retry();
                match self.execute(&retry).await {
                    Err(Error::Transport {
                        status: Some(401),
                        message,
                        ..
                    }) => {
                        self.invalidate();
                        Err(Error::Authentication {
                            username: self.username().unwrap_or_default().to_owned(),
                            message,
                        })
                    }
                    other => other,
                }
            }
            other => other,
        }
    }

    fn can_retry_after_login(&self, request: &Request) -> bool {
        self.has_credentials() && !request.is_login() && !request.is_retry_after_login()
    }

    /// Send the request as-is: no authentication check, no retry.
    pub(crate) async fn execute(&self, request: &Request) -> Result<RawResult, Error> {
        let method = request.method;
        let mut url = resolve_url(self.base_url(), &request.path)?;
        append_query(&mut url, &request.query);

        debug!(%method, %url, "sending request");

        let mut builder = self.http().request(method.as_reqwest(), url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if method.has_body() {
            builder = match &request.body {
                Some(Body::Json(body)) => builder.json(body),
                Some(Body::Form(fields)) => builder.form(fields),
                None => builder,
            };
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| transport_error(method, &url, e.status(), e.to_string()))?;

        let status = resp.status();
        trace!(%method, %url, status = status.as_u16(), "response received");

        if method == Method::Delete && status == StatusCode::NO_CONTENT {
            return Ok(RawResult::Deleted);
        }

        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let message = extract_error_message(&raw, status);
            return Err(transport_error(method, &url, Some(status), message));
        }

        // Login success is the status alone; form-login endpoints often
        // answer with an HTML page.
        if request.is_login() {
            return Ok(RawResult::Document(Value::Null));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| transport_error(method, &url, Some(status), e.to_string()))?;

        if body.trim().is_empty() {
            return Ok(RawResult::Document(Value::Null));
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        if method == Method::Get && !request.raw {
            return Ok(RawResult::Document(formatter::format(value)));
        }
        Ok(RawResult::Document(value))
    }
}

// ── URL and query encoding ───────────────────────────────────────────

/// Absolute URLs are used verbatim; relative paths are appended to the
/// REST base URL with leading separators stripped.
pub(crate) fn resolve_url(base: &Url, path: &str) -> Result<Url, Error> {
    if let Ok(url) = Url::parse(path) {
        if matches!(url.scheme(), "http" | "https") {
            return Ok(url);
        }
    }
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// Append query parameters, repeating the key for every element of a
/// sequence value.
pub(crate) fn append_query(url: &mut Url, params: &[(String, QueryValue)]) {
    let has_values = params.iter().any(|(_, v)| match v {
        QueryValue::One(_) => true,
        QueryValue::Many(values) => !values.is_empty(),
    });
    if !has_values {
        return;
    }

    let mut pairs = url.query_pairs_mut();
    for (key, value) in params {
        match value {
            QueryValue::One(v) => {
                pairs.append_pair(key, v);
            }
            QueryValue::Many(values) => {
                for v in values {
                    pairs.append_pair(key, v);
                }
            }
        }
    }
}

// ── Error shaping ────────────────────────────────────────────────────

fn transport_error(method: Method, url: &Url, status: Option<StatusCode>, message: String) -> Error {
    Error::Transport {
        method: method.to_string(),
        url: url.to_string(),
        status: status.map(|s| s.as_u16()),
        message,
    }
}

/// Pull a readable message out of an error body.
///
/// Structured bodies yield their message field; anything else falls back
/// to a truncated raw body, then to the status reason phrase.
pub(crate) fn extract_error_message(raw: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        let found = ERROR_MESSAGE_POINTERS
            .iter()
            .filter_map(|ptr| value.pointer(ptr))
            .filter_map(Value::as_str)
            .find(|s| !s.trim().is_empty());
        if let Some(message) = found {
            return message.to_owned();
        }
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .map_or_else(|| status.to_string(), str::to_owned)
    } else {
        preview(trimmed).to_owned()
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://nas01:8443/mgmt/rest/").unwrap()
    }

    #[test]
    fn relative_path_joins_base() {
        let url = resolve_url(&base(), "shares/abc").unwrap();
        assert_eq!(url.as_str(), "https://nas01:8443/mgmt/rest/shares/abc");
    }

    #[test]
    fn leading_separators_are_stripped() {
        let url = resolve_url(&base(), "///tasks/42").unwrap();
        assert_eq!(url.as_str(), "https://nas01:8443/mgmt/rest/tasks/42");
    }

    #[test]
    fn absolute_path_is_verbatim() {
        let url = resolve_url(&base(), "https://other:9000/x/y").unwrap();
        assert_eq!(url.as_str(), "https://other:9000/x/y");
    }

    #[test]
    fn sequence_query_repeats_key() {
        let mut url = resolve_url(&base(), "users").unwrap();
        append_query(
            &mut url,
            &[
                ("fields".into(), QueryValue::Many(vec!["name".into(), "uid".into()])),
                ("limit".into(), QueryValue::One("10".into())),
            ],
        );
        assert_eq!(url.query(), Some("fields=name&fields=uid&limit=10"));
    }

    #[test]
    fn empty_query_leaves_url_untouched() {
        let mut url = resolve_url(&base(), "users").unwrap();
        append_query(&mut url, &[("fields".into(), QueryValue::Many(Vec::new()))]);
        assert_eq!(url.query(), None);
    }

    #[test]
    fn error_message_from_structured_body() {
        let msg = extract_error_message(
            r#"{"error":{"code":17,"message":"share name already in use"}}"#,
            StatusCode::CONFLICT,
        );
        assert_eq!(msg, "share name already in use");
    }

    #[test]
    fn error_message_prefers_top_level_field() {
        let msg = extract_error_message(
            r#"{"message":"quota exceeded","detail":"ignored"}"#,
            StatusCode::BAD_REQUEST,
        );
        assert_eq!(msg, "quota exceeded");
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        let msg = extract_error_message("gateway exploded", StatusCode::BAD_GATEWAY);
        assert_eq!(msg, "gateway exploded");
    }

    #[test]
    fn error_message_falls_back_to_reason() {
        let msg = extract_error_message("", StatusCode::NOT_FOUND);
        assert_eq!(msg, "Not Found");
    }
}
