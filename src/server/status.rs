use axum::http::StatusCode;

pub const HTTP_OKAY: StatusCode = StatusCode::OK;
pub const UNAUTHORISED: StatusCode = StatusCode::UNAUTHORIZED;
pub const UNEXPECTED_ERROR: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;
