//! Conversions from library errors into [`SyncError`]

use super::SyncError;

impl From<serde_yaml::Error> for SyncError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::ConfigParse {
            message: err.to_string(),
            line: err.location().map(|loc| loc.line()),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            "request timed out"
        } else if err.is_connect() {
            "connection failed"
        } else if err.is_decode() || err.is_body() {
            "invalid response body"
        } else if let Some(status) = err.status() {
            return Self::Transport {
                message: format!("HTTP {status}: {err}"),
            };
        } else {
            "request failed"
        };
        Self::Transport {
            message: format!("{kind}: {err}"),
        }
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        Self::Config {
            message: format!("Invalid URL: {err}"),
            field: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_error_keeps_line() {
        let err: serde_yaml::Error =
            serde_yaml::from_str::<Vec<u32>>("- 1\n- nope").unwrap_err();
        match SyncError::from(err) {
            SyncError::ConfigParse { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn server_message_surfaces_verbatim() {
        let err = SyncError::server(500, "aria2 rpc unreachable");
        assert_eq!(err.user_message(), "aria2 rpc unreachable");
        assert!(err.is_server());
        assert!(!err.is_transport());
    }

    #[test]
    fn transport_message_is_generic() {
        let err = SyncError::transport("connection refused");
        assert!(err.is_transport());
        assert!(!err.user_message().contains("refused"));
    }
}
