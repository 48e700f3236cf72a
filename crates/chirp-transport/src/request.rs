//! Request descriptors: a captured outbound call that can be replayed.
//!
//! A descriptor owns everything needed to issue the same call again
//! (method, path, body, headers), which is what lets the pipeline park a
//! request while the session is refreshed and reissue it afterwards.

use std::fmt;

use crate::RequestId;

/// HTTP methods used by the Chirp API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// The method name as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single file sent as `multipart/form-data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartFile {
    /// Form field name the backend reads the file from.
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Empty,
    /// Pre-encoded JSON, sent with `content-type: application/json`.
    Json(Vec<u8>),
    Multipart(MultipartFile),
}

/// A captured outbound call.
///
/// The `retried` marker is single-use: once [`mark_retried`](Self::mark_retried)
/// has succeeded, the descriptor will never be recovered again, which
/// bounds every request to one replay no matter how often the session
/// expires underneath it.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    id: RequestId,
    method: Method,
    path: String,
    body: Body,
    headers: Vec<(String, String)>,
    retried: bool,
}

impl RequestDescriptor {
    /// Creates a descriptor with an empty body and a fresh request id.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: RequestId::generate(),
            method,
            path: path.into(),
            body: Body::Empty,
            headers: Vec::new(),
            retried: false,
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

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attaches an already-encoded JSON body.
    pub fn with_json(mut self, bytes: Vec<u8>) -> Self {
        self.body = Body::Json(bytes);
        self
    }

    /// Attaches a single-file multipart body.
    pub fn with_multipart(mut self, file: MultipartFile) -> Self {
        self.body = Body::Multipart(file);
        self
    }

    /// Adds an extra header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Path relative to the API prefix, e.g. `/auth/login`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns `true` if this descriptor addresses exactly `path`.
    pub fn targets(&self, path: &str) -> bool {
        self.path == path
    }

    /// Returns `true` once the descriptor has been through recovery.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Marks the descriptor as retried.
    ///
    /// Returns `false` (and changes nothing) if it was already marked.
    pub fn mark_retried(&mut self) -> bool {
        if self.retried {
            return false;
        }
        self.retried = true;
        true
    }
}

/// A response that arrived, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_retried_first_call_returns_true() {
        let mut req = RequestDescriptor::get("/posts");
        assert!(!req.is_retried());
        assert!(req.mark_retried());
        assert!(req.is_retried());
    }

    #[test]
    fn test_mark_retried_second_call_returns_false() {
        let mut req = RequestDescriptor::get("/posts");
        req.mark_retried();
        assert!(!req.mark_retried(), "marker must be single-use");
    }

    #[test]
    fn test_clone_keeps_request_id_and_marker() {
        let mut req = RequestDescriptor::post("/auth/login").with_json(b"{}".to_vec());
        req.mark_retried();
        let copy = req.clone();
        assert_eq!(copy.id(), req.id());
        assert!(copy.is_retried());
        assert_eq!(copy.body(), &Body::Json(b"{}".to_vec()));
    }

    #[test]
    fn test_targets_matches_exact_path_only() {
        let req = RequestDescriptor::get("/auth/refresh");
        assert!(req.targets("/auth/refresh"));
        assert!(!req.targets("/auth/refresh/extra"));
        assert!(!req.targets("/auth"));
    }

    #[test]
    fn test_http_response_is_success_range() {
        assert!(HttpResponse::new(200, Vec::new()).is_success());
        assert!(HttpResponse::new(204, Vec::new()).is_success());
        assert!(!HttpResponse::new(301, Vec::new()).is_success());
        assert!(!HttpResponse::new(401, Vec::new()).is_success());
    }

    #[test]
    fn test_with_header_appends_in_order() {
        let req = RequestDescriptor::get("/posts")
            .with_header("accept", "application/json")
            .with_header("x-trace", "1");
        assert_eq!(req.headers().len(), 2);
        assert_eq!(req.headers()[1].0, "x-trace");
    }
}
