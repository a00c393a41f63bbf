//! Error types returned by the client.
//!
//! Failures fall into four families that callers can tell apart through
//! [`ClientError::kind`]:
//!
//! - transport: name resolution, refused or timed out connects, short reads;
//! - protocol: bad handshake, malformed or truncated responses;
//! - application: the daemon answered with ERROR or RETRY;
//! - validation: the request was rejected before anything was sent.
//!
//! Warnings never surface as errors. They are attached to the value that
//! carried them, see [`Reply`](crate::protocol::Reply) and
//! [`SearchResult`](crate::SearchResult).
use thiserror::Error;

use crate::protocol::TransportError;

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Protocol,
    Application,
    Validation,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection to {location} failed: {source}")]
    Connect {
        location: String,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("searchd error: {0}")]
    Daemon(String),

    /// Transient daemon condition; the request may be issued again.
    #[error("temporary searchd error: {0}")]
    Retry(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("not connected")]
    NotConnected,

    #[error("already connected")]
    AlreadyConnected,

    #[error("no queries defined, issue add_query() first")]
    NoQueries,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Connect { .. } | ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Protocol(_) => ErrorKind::Protocol,
            ClientError::Daemon(_) | ClientError::Retry(_) => ErrorKind::Application,
            ClientError::Validation(_)
            | ClientError::NotConnected
            | ClientError::AlreadyConnected
            | ClientError::NoQueries => ErrorKind::Validation,
        }
    }

    /// True when the failure happened while establishing the connection.
    pub fn is_connect_error(&self) -> bool {
        matches!(self, ClientError::Connect { .. })
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Retry(_))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("expected searchd protocol version 1+, got version '{version}'")]
    VersionTooOld { version: u32 },

    #[error("received zero-sized searchd response")]
    EmptyResponse,

    #[error(
        "failed to read searchd response (status={status}, ver={version}, len={expected}, read={actual})"
    )]
    IncompleteResponse {
        status: u16,
        version: u16,
        expected: usize,
        actual: usize,
    },

    #[error("unknown status code '{0}'")]
    UnknownStatus(u16),

    #[error("response truncated: needed {needed} bytes at offset {offset}, {remaining} left")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("incomplete reply")]
    IncompleteReply,

    #[error("unexpected response length (expected {expected}, got {actual})")]
    UnexpectedLength { expected: usize, actual: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid limits: {reason}")]
    Limits { reason: &'static str },

    #[error("[range][{name}]: min is greater than max")]
    InvertedRange { name: String },

    #[error("[filter][{attribute}]: values list must not be empty")]
    EmptyValues { attribute: String },

    #[error("unknown {kind} id {id}")]
    UnknownId { kind: &'static str, id: u32 },

    #[error("sort mode {0:?} requires a sort-by clause")]
    MissingSortBy(crate::query::SortMode),

    #[error("[update][{index}]: at least one attribute is required")]
    NoAttributes { index: String },

    #[error("[update][doc {id}]: expected {expected} values, got {actual}")]
    ValueCount {
        id: u64,
        expected: usize,
        actual: usize,
    },

    #[error("excerpts require at least one document")]
    NoDocuments,
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let connect = ClientError::Connect {
            location: "localhost:9312".into(),
            source: TransportError::Refused(io::Error::from(io::ErrorKind::ConnectionRefused)),
        };
        assert_eq!(connect.kind(), ErrorKind::Transport);
        assert!(connect.is_connect_error());

        let protocol: ClientError = ProtocolError::UnknownStatus(9).into();
        assert_eq!(protocol.kind(), ErrorKind::Protocol);
        assert!(!protocol.is_connect_error());

        assert_eq!(ClientError::Daemon("x".into()).kind(), ErrorKind::Application);
        assert!(ClientError::Retry("x".into()).is_retryable());
        assert!(!ClientError::Daemon("x".into()).is_retryable());
        assert_eq!(ClientError::NoQueries.kind(), ErrorKind::Validation);
    }

    #[test]
    fn messages_carry_daemon_text() {
        assert_eq!(
            ClientError::Retry("index busy".into()).to_string(),
            "temporary searchd error: index busy"
        );
        assert_eq!(
            ClientError::Connect {
                location: "/tmp/searchd.sock".into(),
                source: TransportError::Timeout(io::Error::from(io::ErrorKind::TimedOut)),
            }
            .to_string(),
            "connection to /tmp/searchd.sock failed: connection timed out"
        );
    }
}
