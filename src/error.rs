use thiserror::Error;

/// Errors produced while talking to the registry or the container runtime.
#[derive(Debug, Error)]
pub enum EcrError {
    /// A required command line argument was empty or absent
    #[error("-r <repository name> is required")]
    MissingArgument,

    #[error("Failed to load AWS configuration: {0}")]
    ConfigLoadFailure(String),

    /// A remote call to the ECR control plane failed
    #[error("Failed to {operation}: {message}")]
    RemoteQueryFailure {
        operation: &'static str,
        message: String,
    },

    #[error("Repository '{0}' was not found")]
    RepositoryNotFound(String),

    #[error("{count} repositories matched '{name}', expected exactly one")]
    AmbiguousRepository { name: String, count: usize },

    /// The authorization token could not be turned into a password
    #[error("Failed to decode ECR authorization token: {0}")]
    DecodeFailure(String),

    #[error("Registry login failed: {0}")]
    LoginFailure(String),
}

impl EcrError {
    pub(crate) fn remote(operation: &'static str, message: impl Into<String>) -> Self {
        Self::RemoteQueryFailure {
            operation,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EcrError>;

/// Longest raw debug text kept when no service message can be found
const MAX_SDK_ERROR_LEN: usize = 200;

/// Reduce an AWS SDK error to the service message it carries
///
/// Falls back to the (truncated) Debug output of the error.
pub(crate) fn format_sdk_error<E: std::fmt::Debug>(err: &E) -> String {
    let raw = format!("{:?}", err);

    for (open, close) in [("message: Some(\"", "\")"), ("\"Message\":\"", "\"")] {
        let message = raw
            .find(open)
            .map(|at| &raw[at + open.len()..])
            .and_then(|rest| rest.find(close).map(|end| &rest[..end]));
        if let Some(message) = message {
            return message.to_string();
        }
    }

    if raw.len() <= MAX_SDK_ERROR_LEN {
        return raw;
    }
    let cut = (0..=MAX_SDK_ERROR_LEN)
        .rev()
        .find(|i| raw.is_char_boundary(*i))
        .unwrap_or(0);
    format!("{}...", &raw[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    #[allow(dead_code)]
    struct FakeSdkError {
        message: Option<String>,
        code: Option<String>,
    }

    #[test]
    fn test_format_sdk_error_extracts_message() {
        let err = FakeSdkError {
            message: Some("The security token included in the request is invalid".into()),
            code: Some("UnrecognizedClientException".into()),
        };
        assert_eq!(
            format_sdk_error(&err),
            "The security token included in the request is invalid"
        );
    }

    struct RawBody(&'static str);

    impl std::fmt::Debug for RawBody {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    #[test]
    fn test_format_sdk_error_json_message() {
        let raw = RawBody(r#"body: {"__type":"AccessDenied","Message":"not authorized"}"#);
        assert_eq!(format_sdk_error(&raw), "not authorized");
    }

    #[test]
    fn test_format_sdk_error_truncates_long_output() {
        let long = "x".repeat(500);
        let formatted = format_sdk_error(&long);
        assert!(formatted.ends_with("..."));
        assert_eq!(formatted.len(), 203);
    }

    #[test]
    fn test_format_sdk_error_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        let formatted = format_sdk_error(&long);
        assert!(formatted.ends_with("..."));
        assert_eq!(formatted.len(), MAX_SDK_ERROR_LEN - 1 + 3);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            EcrError::MissingArgument.to_string(),
            "-r <repository name> is required"
        );
        assert_eq!(
            EcrError::AmbiguousRepository {
                name: "app".into(),
                count: 2
            }
            .to_string(),
            "2 repositories matched 'app', expected exactly one"
        );
        assert_eq!(
            EcrError::remote("describe the registry", "denied").to_string(),
            "Failed to describe the registry: denied"
        );
    }
}
