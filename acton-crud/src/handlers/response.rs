//! Successful orchestrator responses
//!
//! A [`ResourceResponse`] is the framework-neutral result of an orchestrated
//! operation: a status, an optional negotiated body and an optional
//! `Location`. It converts into an axum response via `IntoResponse`.
//!
//! # Example
//!
//! ```rust
//! use acton_crud::handlers::ResourceResponse;
//! use axum::http::StatusCode;
//!
//! let response = ResourceResponse::no_content();
//! assert_eq!(response.status, StatusCode::NO_CONTENT);
//! assert!(response.body.is_none());
//! ```

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::negotiation::RenderedBody;

/// Result of a successful resource operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Negotiated body, absent for `204 No Content`
    pub body: Option<RenderedBody>,
    /// Value for the `Location` header
    pub location: Option<String>,
}

impl ResourceResponse {
    /// `200 OK` with a body
    pub fn ok(body: RenderedBody) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
            location: None,
        }
    }

    /// `201 Created` with a body
    pub fn created(body: RenderedBody) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: Some(body),
            location: None,
        }
    }

    /// `204 No Content`
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
            location: None,
        }
    }

    /// Add a Location header pointing to the resource
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Content type of the body, if any
    pub fn content_type(&self) -> Option<&'static str> {
        self.body.as_ref().map(|body| body.content_type)
    }
}

impl IntoResponse for ResourceResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => {
                let mut response = (self.status, body.bytes).into_response();
                let headers = response.headers_mut();
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(body.content_type),
                );
                headers.insert(header::VARY, HeaderValue::from_static("accept"));
                response
            }
            None => self.status.into_response(),
        };

        if let Some(location) = self.location {
            if let Ok(value) = HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, value);
            }
        }

        response
    }
}
