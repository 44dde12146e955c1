use crate::fetcher::FetchError;
use crate::pages::{HtmlTemplate, IndexTemplate, NewTemplate};
use crate::{AppState, status};

use axum::Form;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use raleur_bus::MessageBus;
use serde::Deserialize;

/// Fields of the submission form. Missing fields are empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PostForm {
    title: String,
    content: String,
}

pub(crate) async fn index_handler<B>(
    State(AppState { fetcher, .. }): State<AppState<B>>,
) -> Result<Response, FetchError>
where
    B: MessageBus,
{
    let records = fetcher.fetch().await?;

    Ok(HtmlTemplate(IndexTemplate { records: &records }).into_response())
}

pub(crate) async fn new_post_handler() -> impl IntoResponse {
    HtmlTemplate(NewTemplate)
}

pub(crate) async fn submit_post_handler<B>(
    State(AppState { dispatcher, .. }): State<AppState<B>>,
    jar: CookieJar,
    Form(form): Form<PostForm>,
) -> impl IntoResponse
where
    B: MessageBus,
{
    let token = dispatcher.dispatch(form.title, form.content).await;

    (
        StatusCode::MOVED_PERMANENTLY,
        status::write(jar, token),
        [(header::LOCATION, "/api/status")],
    )
}
