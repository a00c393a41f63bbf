//! searchd wire protocol.
//!
//! This module defines the binary protocol spoken between the client and a
//! search daemon: command framing, the response envelope, and the encoders
//! and decoders for every command body.
//!
//! # Overview
//!
//! A session starts with a handshake. The client writes its protocol version
//! (`u32 1`) before reading anything, then reads the daemon's version and
//! requires it to be at least 1.
//!
//! Each command is one frame and is answered by one response envelope:
//!
//! ```text
//! request:  u16 command | u16 command version | u32 length | body
//! response: u16 status  | u16 version         | u32 length | body
//! ```
//!
//! All integers are big-endian, strings are `u32` length plus raw bytes, and
//! 64-bit values travel as high word then low word. See [`wide`] and
//! [`frame`].
//!
//! # Key Components
//!
//! - [`ProtocolTransport`]: frames requests and reads whole responses over
//!   any `Read + Write` stream.
//! - [`Response`]: envelope status dispatch into a [`Reply`].
//! - [`request`]: SEARCH body encoding and batching.
//! - [`SearchResultParser`]: one [`SearchResult`](crate::SearchResult) per
//!   batched query.
//! - [`commands`]: EXCERPT, KEYWORDS, UPDATE, STATUS, FLUSH_ATTRS and
//!   PERSIST bodies.
//!
//! # See Also
//!
//! - [`connection`](crate::connection): handshake and connection lifecycle.
pub mod commands;
pub mod frame;
pub mod request;
mod response;
mod search;
mod transport;
pub mod wide;

pub use frame::{FrameReader, FrameWriter};
pub use response::{Reply, Response, ResponseStatus};
pub use search::SearchResultParser;
pub use transport::{
    HEADER_SIZE, ProtocolTransport, RequestHeader, ResponseHeader, TransportError,
};

/// Version word the client announces during the handshake.
pub const CLIENT_PROTOCOL: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Search,
    Excerpt,
    Update,
    Keywords,
    Persist,
    Status,
    FlushAttrs,
}

impl Command {
    pub const fn code(self) -> u16 {
        match self {
            Command::Search => 0,
            Command::Excerpt => 1,
            Command::Update => 2,
            Command::Keywords => 3,
            Command::Persist => 4,
            Command::Status => 5,
            Command::FlushAttrs => 7,
        }
    }

    /// Command version the client speaks.
    pub const fn version(self) -> u16 {
        match self {
            Command::Search => 0x119,
            Command::Excerpt => 0x104,
            Command::Update => 0x102,
            Command::Keywords => 0x100,
            Command::Persist => 0,
            Command::Status => 0x100,
            Command::FlushAttrs => 0x100,
        }
    }
}
