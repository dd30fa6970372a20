use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt;

use crate::predictor::InferenceError;

/// Request-time failures that end in an error page
#[derive(Debug)]
pub enum AppError {
    /// Scaling or model evaluation failed
    Inference(InferenceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inference(err) => write!(f, "Inference error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Inference(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, kind = error_type_name(&self), "Request failed");

        // Details stay in the log; the page only says something went wrong
        let body = Html(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Something went wrong</title></head>
<body>
    <h1>Something went wrong</h1>
    <p>We could not compute your prediction right now ({}). Please try again later.</p>
    <p><a href="/">Back to the form</a></p>
</body>
</html>
"#,
            error_type_name(&self)
        ));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::Inference(_) => "inference_error",
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        Self::Inference(err)
    }
}
