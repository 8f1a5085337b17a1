use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gapcheck_core::GapError;

/// Carries an explicit status through the `anyhow::Error` chain without
/// touching the `GapError` enum.
#[derive(Debug)]
struct StatusError(StatusCode, String);

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.1)
    }
}

impl std::error::Error for StatusError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. The body is always
/// `{"error": "<message>"}`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(StatusError(StatusCode::BAD_REQUEST, msg.into()).into())
    }

    /// Construct a 409 Conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self(StatusError(StatusCode::CONFLICT, msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(StatusError(status, msg)) = self.0.downcast_ref::<StatusError>() {
            let body = serde_json::json!({ "error": msg });
            return (*status, axum::Json(body)).into_response();
        }

        let status = match self.0.downcast_ref::<GapError>() {
            Some(e) => match e {
                GapError::ReportNotFound(_) => StatusCode::NOT_FOUND,
                GapError::NotInitialized
                | GapError::InvalidSlug(_)
                | GapError::UnknownField(_)
                | GapError::InvalidValue { .. }
                | GapError::OutOfRange { .. } => StatusCode::BAD_REQUEST,
                GapError::MissingCompanyName | GapError::InvalidUpdate(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                GapError::Store(_) | GapError::Io(_) | GapError::Yaml(_) | GapError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: GapError) -> StatusCode {
        AppError(err.into()).into_response().status()
    }

    #[test]
    fn report_not_found_maps_to_404() {
        assert_eq!(
            status_of(GapError::ReportNotFound("acme".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn invalid_slug_maps_to_400() {
        assert_eq!(
            status_of(GapError::InvalidSlug("BAD SLUG".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unknown_field_maps_to_400() {
        assert_eq!(
            status_of(GapError::UnknownField("market.nope".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn out_of_range_maps_to_400() {
        let err = GapError::OutOfRange {
            field: "market.buyer_rate".into(),
            value: 140.0,
            min: 0.0,
            max: 100.0,
        };
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_company_name_maps_to_422() {
        assert_eq!(
            status_of(GapError::MissingCompanyName),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn invalid_update_maps_to_422() {
        assert_eq!(
            status_of(GapError::InvalidUpdate("bad type".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn store_and_io_errors_map_to_500() {
        assert_eq!(
            status_of(GapError::Store("db locked".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let io_err = std::io::Error::other("disk full");
        assert_eq!(status_of(GapError::Io(io_err)), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_gap_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_constructor_maps_to_400() {
        let response = AppError::bad_request("missing paste").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_constructor_maps_to_409() {
        let response = AppError::conflict("report 'acme' already exists").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn response_body_is_json() {
        let response = AppError(GapError::ReportNotFound("acme".into()).into()).into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
