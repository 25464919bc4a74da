//! Request descriptors and response decoding

use crate::Result;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response};
use serde_json::Value;
use tracing::warn;

/// One file field of a multipart payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Multipart payload that can be rebuilt for a replay.
///
/// `reqwest::multipart::Form` is consumed on send, so the parts are kept in
/// owned form and turned into a fresh `Form` per attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    text: Vec<(String, String)>,
    files: Vec<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.text.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    pub(crate) fn to_form(&self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in &self.text {
            form = form.text(name.clone(), value.clone());
        }
        for file in &self.files {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            if let Some(mime) = &file.mime {
                part = part.mime_str(mime)?;
            }
            form = form.part(file.field.clone(), part);
        }
        Ok(form)
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON with `Content-Type: application/json`
    Json(Value),
    /// Encoding left to the transport (boundary and content type)
    Multipart(MultipartForm),
}

/// Everything `send` needs besides the path
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<RequestBody>,
    pub headers: HeaderMap,
    /// Whether a 401 may trigger a session refresh and one replay
    pub retry: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: HeaderMap::new(),
            retry: true,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    #[must_use]
    pub fn with_multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn without_retry(mut self) -> Self {
        self.retry = false;
        self
    }

    /// The same request, marked so that it can never trigger another refresh
    #[must_use]
    pub(crate) fn into_replay(self) -> Self {
        self.without_retry()
    }
}

/// Paths that manage the session itself never go through refresh-and-retry
pub(crate) fn is_session_path(path: &str) -> bool {
    path.contains("/refresh") || path.contains("/logout")
}

/// Decode a response body: JSON when declared, text otherwise.
///
/// Unreadable bodies become `Value::Null`.
pub(crate) async fn read_body(response: Response) -> Value {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.contains("application/json"));

    if is_json {
        match response.json::<Value>().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Discarding malformed JSON response body: {e}");
                Value::Null
            }
        }
    } else {
        match response.text().await {
            Ok(text) => Value::String(text),
            Err(e) => {
                warn!("Failed to read response body: {e}");
                Value::Null
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_paths_are_exempt() {
        assert!(is_session_path("/api/users/refresh"));
        assert!(is_session_path("/api/users/logout"));
        assert!(!is_session_path("/api/wishlist/123"));
        assert!(!is_session_path("/api/users/me"));
    }

    #[test]
    fn replay_never_retries() {
        let options = RequestOptions::delete();
        assert!(options.retry);
        let replay = options.into_replay();
        assert!(!replay.retry);
        assert_eq!(replay.method, Method::DELETE);
    }

    #[test]
    fn multipart_form_is_rebuildable() {
        let form = MultipartForm::new().file(FilePart {
            field: "image".into(),
            file_name: "shoe.png".into(),
            mime: Some("image/png".into()),
            bytes: vec![1, 2, 3],
        });
        assert!(form.to_form().is_ok());
        assert!(form.to_form().is_ok());
        assert_eq!(form.files().len(), 1);
    }
}
