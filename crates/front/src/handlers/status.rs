use crate::pages::{HtmlTemplate, StatusTemplate};
use crate::status;

use axum::response::IntoResponse;
use axum_extra::extract::cookie::CookieJar;

pub(crate) async fn status_handler(jar: CookieJar) -> impl IntoResponse {
    let status = status::read(&jar);

    HtmlTemplate(StatusTemplate {
        message: &status.message,
    })
    .into_response()
}
