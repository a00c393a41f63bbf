use log::warn;

use crate::error::{ClientError, ProtocolError};

use super::frame::FrameReader;

/// Status word of a response envelope or of a search result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    Error,
    Retry,
    Warning,
}

impl ResponseStatus {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ResponseStatus::Ok),
            1 => Some(ResponseStatus::Error),
            2 => Some(ResponseStatus::Retry),
            3 => Some(ResponseStatus::Warning),
            _ => None,
        }
    }
}

impl From<ResponseStatus> for u32 {
    fn from(value: ResponseStatus) -> Self {
        match value {
            ResponseStatus::Ok => 0,
            ResponseStatus::Error => 1,
            ResponseStatus::Retry => 2,
            ResponseStatus::Warning => 3,
        }
    }
}

/// A fully read response envelope, not yet checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub version: u16,
    pub body: Vec<u8>,
}

/// Payload of a successful response plus any non-fatal notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub payload: Vec<u8>,
    pub warning: Option<String>,
}

impl Response {
    /// Dispatches on the status word.
    ///
    /// A WARNING body starts with a length-prefixed message that is split off;
    /// the rest is the real payload. ERROR and RETRY fail the call with the
    /// daemon's message. An OK response from a daemon speaking an older
    /// command version than `client_version` succeeds with a warning.
    pub fn into_reply(self, client_version: u16) -> Result<Reply, ClientError> {
        let status = ResponseStatus::from_code(u32::from(self.status))
            .ok_or(ProtocolError::UnknownStatus(self.status))?;

        match status {
            ResponseStatus::Ok => {
                let warning = (self.version < client_version).then(|| {
                    let notice = format!(
                        "searchd command v.{}.{} older than client's v.{}.{}, some options might not work",
                        self.version >> 8,
                        self.version & 0xff,
                        client_version >> 8,
                        client_version & 0xff
                    );
                    warn!("{notice}");
                    notice
                });
                Ok(Reply {
                    payload: self.body,
                    warning,
                })
            }
            ResponseStatus::Warning => {
                let mut reader = FrameReader::new(&self.body);
                let message = reader.string()?;
                warn!("searchd warning: {message}");
                Ok(Reply {
                    payload: reader.rest().to_vec(),
                    warning: Some(message),
                })
            }
            ResponseStatus::Error => Err(ClientError::Daemon(message(&self.body))),
            ResponseStatus::Retry => Err(ClientError::Retry(message(&self.body))),
        }
    }
}

/// Error bodies are a length-prefixed string; the prefix is skipped.
fn message(body: &[u8]) -> String {
    String::from_utf8_lossy(body.get(4..).unwrap_or_default()).into_owned()
}
