use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited - gave up after {retries} retries: {url}")]
    RateLimited { url: String, retries: u32 },

    #[error("HTTP status {status} from {url}: {body}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("Invalid response from {url}: {source}")]
    InvalidResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: StatusCode, url: &str, body: &str) -> Self {
        ApiError::Status {
            status,
            url: url.to_string(),
            body: Self::truncate_body(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_keeps_short_body() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "https://x/1", "no such route");
        match err {
            ApiError::Status { status, url, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(url, "https://x/1");
                assert_eq!(body, "no such route");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_status_truncates_long_body() {
        let long = "é".repeat(400); // 800 bytes, multi-byte chars
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "u", &long);
        let ApiError::Status { body, .. } = err else {
            panic!("expected status error");
        };
        assert!(body.contains("(truncated, 800 total bytes)"));
        assert!(body.len() < 600);
    }
}
