use std::fmt::Display;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde_json::json;
use thiserror::Error;

use crate::models::Coordinate;
use crate::polyline::PolylineError;

/// Why a directions request produced no usable response.
#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("directions service answered with HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("failed to parse directions response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("directions service rejected the request ({status}): {message}")]
    Api { status: String, message: String },
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route fetch failed: {0}")]
    FetchFailed(#[from] FetchCause),

    #[error("malformed polyline: {0}")]
    MalformedPolyline(#[from] PolylineError),
}

/// Invalid input received from a caller.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("latitude and longitude must be given together")]
    MissingCoordinate,

    #[error("coordinate {0} is out of range")]
    OutOfRange(Coordinate),
}

#[derive(Debug)]
pub struct Error(anyhow::Error);

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<RequestError> for Error {
    fn from(e: RequestError) -> Self {
        Self(e.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        if self.0.downcast_ref::<RequestError>().is_some() {
            StatusCode::BAD_REQUEST
        } else if self.0.downcast_ref::<RouteError>().is_some() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_status_codes() {
        let bad_input = Error::from(RequestError::MissingCoordinate);
        assert_eq!(bad_input.status_code(), StatusCode::BAD_REQUEST);

        let upstream = Error::from(anyhow::Error::new(RouteError::from(FetchCause::Transport("refused".into()))));
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.to_string(), "route fetch failed: transport error: refused");

        let malformed = Error::from(anyhow::Error::new(RouteError::from(PolylineError::Truncated { offset: 3 })));
        assert_eq!(malformed.status_code(), StatusCode::BAD_GATEWAY);

        let other = Error::from(anyhow::anyhow!("session store unavailable"));
        assert_eq!(other.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
