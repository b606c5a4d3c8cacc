//! Error types for buildmaster-client

use thiserror::Error;

/// Errors that can occur while talking to the build master
#[derive(Error, Debug)]
pub enum BuildMasterError {
    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Request did not complete within the configured timeout
    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// Connection or transport failure
    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// Server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Builder listing body was not a JSON array or object of names
    #[error("malformed builder listing: {0}")]
    MalformedListing(String),
}

impl BuildMasterError {
    pub(crate) fn from_reqwest(url: &str, secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BuildMasterError::Timeout {
                url: url.to_string(),
                secs,
            }
        } else if let Some(status) = err.status() {
            BuildMasterError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            BuildMasterError::Http {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_names_url_and_duration() {
        let err = BuildMasterError::Timeout {
            url: "http://master:10117/json/builders".to_string(),
            secs: 20,
        };
        let msg = err.to_string();
        assert!(msg.contains("master:10117"));
        assert!(msg.contains("20s"));
    }

    #[test]
    fn test_status_display() {
        let err = BuildMasterError::Status {
            url: "http://master/json/builders".to_string(),
            status: 503,
        };
        assert!(err.to_string().contains("503"));
    }
}
