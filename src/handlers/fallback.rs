use crate::models::api::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

/// 404 for unmatched routes, in the same JSON error shape as everything
/// else.
pub async fn fallback_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            error: "Endpoint not found".to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fallback_is_404() {
        let response = fallback_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
