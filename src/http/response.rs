use std::path::Path;

use serde::Deserialize;

use crate::http::request::ResolvedPath;

/// Body sent with every 404.
pub const NOT_FOUND_BODY: &[u8] = b"<b>404 Error - resource not found on this server</b>\n";

/// HTTP status codes the server produces.
///
/// - `Ok` (200): file found and returned verbatim
/// - `NotFound` (404): anything else, including malformed requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use dfa_httpd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
        }
    }
}

/// Separator used between the status line, headers and the blank line.
///
/// `Lf` is what deployed clients of this server expect. `Crlf` is the
/// RFC 9112 form and must be opted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            LineEnding::Lf => b"\n",
            LineEnding::Crlf => b"\r\n",
        }
    }
}

/// A complete HTTP response ready to be serialized.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    /// Headers in the order they are written.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// 200 with `Content-Type: text/html` and the file bytes unmodified.
    pub fn ok_html(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::Ok,
            headers: vec![("Content-Type".to_string(), "text/html".to_string())],
            body: body.into(),
        }
    }

    /// 404 with no headers and the fixed HTML body.
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NotFound,
            headers: Vec::new(),
            body: NOT_FOUND_BODY.to_vec(),
        }
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// What happened to a request, as far as the process exit status cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Served,
    NotFound,
}

/// A response together with the outcome it represents.
#[derive(Debug)]
pub struct Responded {
    pub response: Response,
    pub outcome: Outcome,
}

impl Responded {
    fn not_found() -> Self {
        Self {
            response: Response::not_found(),
            outcome: Outcome::NotFound,
        }
    }
}

/// Reads the file behind `path` (relative to `root`) and builds the reply.
///
/// A missing path, an unreadable file, a directory and, when `confine` is
/// set, a path that could escape `root` all produce the 404.
pub async fn load(root: &Path, path: Option<&ResolvedPath>, confine: bool) -> Responded {
    let Some(path) = path else {
        tracing::debug!("Empty resource, answering 404");
        return Responded::not_found();
    };

    if confine && !path.is_confined() {
        tracing::warn!(path = %path, "Resource escapes serving root, answering 404");
        return Responded::not_found();
    }

    let full = root.join(path);
    match tokio::fs::read(&full).await {
        Ok(content) => {
            tracing::debug!(path = %full.display(), bytes = content.len(), "Loaded file");
            Responded {
                response: Response::ok_html(content),
                outcome: Outcome::Served,
            }
        }
        Err(e) => {
            tracing::debug!(path = %full.display(), error = %e, "Could not open resource");
            Responded::not_found()
        }
    }
}
