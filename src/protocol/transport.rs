use std::io::{self, Read, Write};

use bincode::{
    Decode, Encode,
    config::{BigEndian, Configuration, Fixint},
    decode_from_slice, encode_into_std_write,
};
use log::trace;
use thiserror::Error;

use crate::error::{ClientError, ProtocolError};

use super::{Command, Response, frame::read_full};

/// Size of both the request and the response header.
pub const HEADER_SIZE: usize = 8;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to resolve '{host}': {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("connection refused")]
    Refused(#[source] io::Error),
    #[error("connection timed out")]
    Timeout(#[source] io::Error),
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        expected: usize,
        actual: usize,
        partial: Vec<u8>,
    },
    #[error("failed to encode frame header: {0}")]
    Serialize(#[from] bincode::error::EncodeError),
    #[error("failed to decode frame header: {0}")]
    Deserialize(#[from] bincode::error::DecodeError),
    #[error("Transport IO Error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Sorts a connect failure into refused, timed out or generic I/O.
    pub fn from_connect(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::ConnectionRefused => TransportError::Refused(e),
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::Timeout(e),
            _ => TransportError::Io(e),
        }
    }
}

/// `u16 command, u16 version, u32 length`.
#[derive(Debug, Clone, Copy, Encode, Decode, PartialEq, Eq)]
pub struct RequestHeader {
    pub command: u16,
    pub version: u16,
    pub length: u32,
}

/// `u16 status, u16 version, u32 length`.
#[derive(Debug, Clone, Copy, Encode, Decode, PartialEq, Eq)]
pub struct ResponseHeader {
    pub status: u16,
    pub version: u16,
    pub length: u32,
}

pub struct ProtocolTransport<T: Read + Write> {
    stream: T,
    config: Configuration<BigEndian, Fixint>,
}

impl<T: Read + Write> ProtocolTransport<T> {
    pub fn new(stream: T) -> Self {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_fixed_int_encoding();
        Self { stream, config }
    }

    pub fn get_ref(&self) -> &T {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.stream
    }

    /// Sends the bare `u32` protocol version word of the handshake.
    pub fn write_version(&mut self, version: u32) -> Result<(), TransportError> {
        encode_into_std_write(version, &mut self.stream, self.config)?;
        self.stream.flush()?;
        Ok(())
    }

    pub fn read_version(&mut self) -> Result<u32, TransportError> {
        let raw = read_full(&mut self.stream, 4)?;
        let (version, _): (u32, usize) = decode_from_slice(&raw, self.config)?;
        Ok(version)
    }

    /// Writes header and body with a single `write_all`.
    pub fn write_request(&mut self, command: Command, body: &[u8]) -> Result<(), TransportError> {
        let header = RequestHeader {
            command: command.code(),
            version: command.version(),
            length: body.len() as u32,
        };
        trace!("request header: {header:?}");

        let mut frame = Vec::with_capacity(HEADER_SIZE + body.len());
        encode_into_std_write(header, &mut frame, self.config)?;
        frame.extend_from_slice(body);

        self.stream.write_all(&frame)?;
        self.stream.flush()?;
        Ok(())
    }

    pub fn read_response(&mut self) -> Result<Response, ClientError> {
        let raw = match read_full(&mut self.stream, HEADER_SIZE) {
            Ok(raw) => raw,
            Err(TransportError::ShortRead { .. }) => return Err(ProtocolError::EmptyResponse.into()),
            Err(e) => return Err(e.into()),
        };
        let (header, _): (ResponseHeader, usize) =
            decode_from_slice(&raw, self.config).map_err(TransportError::from)?;
        trace!("response header: {header:?}");

        if header.length == 0 {
            return Err(ProtocolError::EmptyResponse.into());
        }

        let body = match read_full(&mut self.stream, header.length as usize) {
            Ok(body) => body,
            Err(TransportError::ShortRead {
                expected, actual, ..
            }) => {
                return Err(ProtocolError::IncompleteResponse {
                    status: header.status,
                    version: header.version,
                    expected,
                    actual,
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Response {
            status: header.status,
            version: header.version,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn reply(status: u16, version: u16, length: u32, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&status.to_be_bytes());
        out.extend_from_slice(&version.to_be_bytes());
        out.extend_from_slice(&length.to_be_bytes());
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn request_frame_layout() {
        let mut transport = ProtocolTransport::new(Cursor::new(Vec::new()));
        transport
            .write_request(Command::Status, &[0, 0, 0, 1])
            .unwrap();

        assert_eq!(
            transport.get_ref().get_ref(),
            &vec![0, 5, 1, 0, 0, 0, 0, 4, 0, 0, 0, 1]
        );
    }

    #[test]
    fn empty_body_frame() {
        let mut transport = ProtocolTransport::new(Cursor::new(Vec::new()));
        transport.write_request(Command::FlushAttrs, &[]).unwrap();

        assert_eq!(transport.get_ref().get_ref(), &vec![0, 7, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn handshake_words() {
        let mut transport = ProtocolTransport::new(Cursor::new(Vec::new()));
        transport.write_version(1).unwrap();
        assert_eq!(transport.get_ref().get_ref(), &vec![0, 0, 0, 1]);

        let mut transport = ProtocolTransport::new(Cursor::new(vec![0, 0, 0, 3]));
        assert_eq!(transport.read_version().unwrap(), 3);

        let mut transport = ProtocolTransport::new(Cursor::new(vec![0, 0]));
        assert!(matches!(
            transport.read_version(),
            Err(TransportError::ShortRead { actual: 2, .. })
        ));
    }

    #[test]
    fn reads_whole_response() {
        let bytes = reply(0, 0x119, 4, &[0, 0, 0, 9]);
        let mut transport = ProtocolTransport::new(Cursor::new(bytes));

        let resp = transport.read_response().unwrap();
        assert_eq!(resp.status, 0);
        assert_eq!(resp.version, 0x119);
        assert_eq!(resp.body, vec![0, 0, 0, 9]);
    }

    #[test]
    fn short_header_is_empty_response() {
        let mut transport = ProtocolTransport::new(Cursor::new(vec![0, 0, 1]));
        assert!(matches!(
            transport.read_response(),
            Err(ClientError::Protocol(ProtocolError::EmptyResponse))
        ));

        let mut transport = ProtocolTransport::new(Cursor::new(reply(0, 0x100, 0, &[])));
        assert!(matches!(
            transport.read_response(),
            Err(ClientError::Protocol(ProtocolError::EmptyResponse))
        ));
    }

    #[test]
    fn short_body_is_incomplete() {
        let bytes = reply(1, 0x100, 10, &[1, 2, 3]);
        let mut transport = ProtocolTransport::new(Cursor::new(bytes));

        match transport.read_response() {
            Err(ClientError::Protocol(ProtocolError::IncompleteResponse {
                status,
                version,
                expected,
                actual,
            })) => {
                assert_eq!((status, version, expected, actual), (1, 0x100, 10, 3));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
