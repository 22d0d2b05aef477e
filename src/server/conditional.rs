//! Conditional Requests
//!
//! Evaluates `If-Match` and `If-None-Match` against the tag this server
//! attaches. The wrapped `ServeDir` only knows modification dates, so the
//! date-based headers are withheld from it whenever an entity-tag header
//! takes precedence over them.

use axum::http::{header, HeaderMap, Method, Request, StatusCode};

use crate::etag::ETag;

// == Outcome ==
/// What the precondition check asks the response to become.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Serve the delegate's response as is
    Proceed,
    /// `304 Not Modified`
    NotModified,
    /// `412 Precondition Failed`
    PreconditionFailed,
}

impl Outcome {
    pub fn status(self) -> Option<StatusCode> {
        match self {
            Outcome::Proceed => None,
            Outcome::NotModified => Some(StatusCode::NOT_MODIFIED),
            Outcome::PreconditionFailed => Some(StatusCode::PRECONDITION_FAILED),
        }
    }
}

// == Preconditions ==
/// Entity-tag preconditions captured from a request.
#[derive(Debug, Clone, Default)]
pub struct Preconditions {
    if_match: Option<String>,
    if_none_match: Option<String>,
    safe_method: bool,
}

impl Preconditions {
    /// Captures the entity-tag headers of `req`.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let headers = req.headers();
        Self {
            if_match: header_string(headers, header::IF_MATCH),
            if_none_match: header_string(headers, header::IF_NONE_MATCH),
            safe_method: req.method() == Method::GET || req.method() == Method::HEAD,
        }
    }

    /// Drops the date validators that an entity-tag header overrides
    /// (RFC 9110 §13.2.2), so the delegate cannot answer from dates alone.
    pub fn strip_overridden(&self, headers: &mut HeaderMap) {
        if self.if_match.is_some() {
            headers.remove(header::IF_UNMODIFIED_SINCE);
        }
        if self.if_none_match.is_some() {
            headers.remove(header::IF_MODIFIED_SINCE);
        }
    }

    /// Checks the preconditions against the current tag.
    pub fn evaluate(&self, tag: &ETag) -> Outcome {
        if let Some(if_match) = &self.if_match {
            if !tag.strong_matches(if_match) {
                return Outcome::PreconditionFailed;
            }
        }

        match &self.if_none_match {
            Some(if_none_match) if tag.matches(if_none_match) => {
                if self.safe_method {
                    Outcome::NotModified
                } else {
                    Outcome::PreconditionFailed
                }
            }
            _ => Outcome::Proceed,
        }
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
