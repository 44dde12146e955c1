use crate::AppState;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use raleur_bus::MessageBus;
use tracing::error;

pub(crate) async fn metrics_handler<B>(
    State(AppState { metrics, .. }): State<AppState<B>>,
) -> Response
where
    B: MessageBus,
{
    match metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
