//! Error types for the SOAP protocol client.
//!
//! Every failure of a single poll falls into one of three classes: the
//! exchange with the device failed, the response was not the XML document we
//! expect, or an element's text did not fit the record field. None of them
//! leave the client; they are recorded in the defaulted fetch result instead.

use serde::Serialize;
use std::fmt;

/// Failure class of a single SOAP call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Transport,
    Protocol,
    Mapping,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 3] = [ErrorKind::Transport, ErrorKind::Protocol, ErrorKind::Mapping];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Mapping => "mapping",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            ErrorKind::Transport => 0,
            ErrorKind::Protocol => 1,
            ErrorKind::Mapping => 2,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SoapError {
    #[error("HTTP exchange failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("device answered with HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("I/O error while reading response: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("response ended before {0}")]
    Truncated(&'static str),

    #[error("unexpected content {found} while looking for {expected}")]
    UnexpectedContent {
        expected: &'static str,
        found: String,
    },

    #[error("cannot map <{element}> value {value:?}: {reason}")]
    Mapping {
        element: String,
        value: String,
        reason: String,
    },
}

impl SoapError {
    /// Classifies the error for logging and poll statistics.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SoapError::Http(_) | SoapError::Status(_) | SoapError::Io(_) => ErrorKind::Transport,
            // the body stream surfaces socket errors through the XML reader
            SoapError::Xml(quick_xml::Error::Io(_)) => ErrorKind::Transport,
            SoapError::Xml(_) | SoapError::Truncated(_) | SoapError::UnexpectedContent { .. } => {
                ErrorKind::Protocol
            }
            SoapError::Mapping { .. } => ErrorKind::Mapping,
        }
    }

    pub(crate) fn mapping(element: &str, value: &str, reason: impl fmt::Display) -> Self {
        SoapError::Mapping {
            element: element.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_kind_classification() {
        let io = SoapError::Io(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"));
        assert_eq!(io.kind(), ErrorKind::Transport);

        let xml_io = SoapError::Xml(quick_xml::Error::Io(Arc::new(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "eof",
        ))));
        assert_eq!(xml_io.kind(), ErrorKind::Transport);

        assert_eq!(SoapError::Truncated("Body").kind(), ErrorKind::Protocol);
        assert_eq!(
            SoapError::mapping("NewByteSendRate", "abc", "invalid digit").kind(),
            ErrorKind::Mapping
        );
    }

    #[test]
    fn test_mapping_message() {
        let err = SoapError::mapping("NewByteSendRate", "abc", "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "cannot map <NewByteSendRate> value \"abc\": invalid digit found in string"
        );
    }
}
