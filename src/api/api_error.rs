use crate::error::Error;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub(crate) struct APIError(anyhow::Error);

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        let any_err = self.0;
        let status = match any_err.downcast_ref::<Error>() {
            Some(Error::Unauthorized) => StatusCode::UNAUTHORIZED,
            Some(Error::InvalidRequest(_) | Error::ConfigFileNotFound(_)) => {
                StatusCode::BAD_REQUEST
            }
            Some(Error::DomainNotConfigured(_) | Error::MissingTls(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Some(Error::JsonExtractorRejection(err)) => rejection_status(err),
            // `WithRejection` hands us the bare extractor rejection.
            None => any_err
                .downcast_ref::<JsonRejection>()
                .map_or(StatusCode::INTERNAL_SERVER_ERROR, rejection_status),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("request failed: {any_err:#}");
        }
        let body = Json(json!({
            "error": format!("{any_err}"),
        }));
        (status, body).into_response()
    }
}

fn rejection_status(err: &JsonRejection) -> StatusCode {
    match err {
        JsonRejection::JsonDataError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        JsonRejection::JsonSyntaxError(_) => StatusCode::BAD_REQUEST,
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<E> From<E> for APIError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
