pub mod client;
pub mod connection;
pub mod error;
pub mod protocol;
pub mod query;
pub mod result;

pub use client::{ClientConfig, SearchClient};
pub use connection::{Connection, ConnectionState, Endpoint};
pub use error::{ClientError, ErrorKind, ProtocolError, ValidationError};
pub use protocol::commands::{AttributeUpdate, ExcerptOptions, Keyword, UpdateValues};
pub use query::{Filter, QueryRequest};
pub use result::{AttrValue, Match, MatchLayout, SchemaType, SearchResult, WordStats};
