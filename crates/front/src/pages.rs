//! HTML pages, compiled from the askama templates under `templates/`.
//!
//! Every interpolated value is HTML-escaped by askama.

use crate::record::Record;

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

/// The record list. Records keep the order the backend sent them in.
#[derive(Template)]
#[template(path = "index.html")]
pub(crate) struct IndexTemplate<'a> {
    pub records: &'a [Record],
}

/// The submission form.
#[derive(Template)]
#[template(path = "new.html")]
pub(crate) struct NewTemplate;

/// The status page. An empty message renders an empty paragraph.
#[derive(Template)]
#[template(path = "status.html")]
pub(crate) struct StatusTemplate<'a> {
    pub message: &'a str,
}

/// Renders a template as an HTML response.
pub(crate) struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                error!(error = %e, "failed to render template");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
