use thiserror::Error;

/// Failure of a single request against a catalog collection.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to reach {resource}: {source}")]
    Network {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unauthorized request to {resource} (status {status})")]
    Unauthorized { resource: String, status: u16 },

    #[error("Access denied to {resource}: {body}")]
    AccessDenied { resource: String, body: String },

    #[error("{resource} record not found: {body}")]
    NotFound { resource: String, body: String },

    #[error("Rate limited by {resource} - please wait before retrying")]
    RateLimited { resource: String },

    #[error("Server error from {resource} (status {status}): {body}")]
    ServerError {
        resource: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected status {status} from {resource}: {body}")]
    UnexpectedStatus {
        resource: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {resource}: {message}")]
    InvalidResponse { resource: String, message: String },

    #[error("Failed to encode {resource} record: {message}")]
    Encode { resource: String, message: String },
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

    pub fn from_status(resource: &str, status: reqwest::StatusCode, body: &str) -> Self {
        let resource = resource.to_string();
        let body = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized {
                resource,
                status: 401,
            },
            403 => ApiError::AccessDenied { resource, body },
            404 => ApiError::NotFound { resource, body },
            429 => ApiError::RateLimited { resource },
            code @ 500..=599 => ApiError::ServerError {
                resource,
                status: code,
                body,
            },
            code => ApiError::UnexpectedStatus {
                resource,
                status: code,
                body,
            },
        }
    }

    pub fn network(resource: &str, source: reqwest::Error) -> Self {
        ApiError::Network {
            resource: resource.to_string(),
            source,
        }
    }

    pub fn invalid_response(resource: &str, message: impl ToString) -> Self {
        ApiError::InvalidResponse {
            resource: resource.to_string(),
            message: message.to_string(),
        }
    }

    /// Name of the collection the failed request targeted.
    pub fn resource(&self) -> &str {
        match self {
            ApiError::Network { resource, .. }
            | ApiError::Unauthorized { resource, .. }
            | ApiError::AccessDenied { resource, .. }
            | ApiError::NotFound { resource, .. }
            | ApiError::RateLimited { resource }
            | ApiError::ServerError { resource, .. }
            | ApiError::UnexpectedStatus { resource, .. }
            | ApiError::InvalidResponse { resource, .. }
            | ApiError::Encode { resource, .. } => resource,
        }
    }

    /// HTTP status of the failed response, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. }
            | ApiError::ServerError { status, .. }
            | ApiError::UnexpectedStatus { status, .. } => Some(*status),
            ApiError::AccessDenied { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Network { source, .. } => source.status().map(|s| s.as_u16()),
            ApiError::InvalidResponse { .. } | ApiError::Encode { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_carries_resource_and_status() {
        let err = ApiError::from_status("offers", StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.resource(), "offers");
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("offers"));

        let err = ApiError::from_status("banners", StatusCode::NOT_FOUND, "");
        assert!(matches!(err, ApiError::NotFound { .. }));
        assert_eq!(err.status(), Some(404));

        let err = ApiError::from_status("categories", StatusCode::IM_A_TEAPOT, "");
        assert_eq!(err.status(), Some(418));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "₹".repeat(400);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated, 1200 total bytes"));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }
}
