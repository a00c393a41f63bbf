//! Session object tying queries, commands and the connection together.
//!
//! A [`SearchClient`] owns one [`Connection`] plus the queue of encoded
//! queries waiting for [`run_queries`](SearchClient::run_queries). Every
//! operation returns a `Result`; the outcome of the most recent operation is
//! also kept on the session and can be read back through
//! [`last_error`](SearchClient::last_error),
//! [`last_warning`](SearchClient::last_warning) and
//! [`is_connect_error`](SearchClient::is_connect_error).
//!
//! # Example
//!
//! ```no_run
//! use sift::{ClientConfig, SearchClient, query::QueryRequest};
//!
//! let mut client = SearchClient::new(ClientConfig::default());
//! let mut request = QueryRequest::new("hello world");
//! request.set_index("articles");
//!
//! match client.query(&request) {
//!     Ok(result) => println!("{} of {} found", result.matches.len(), result.total_found),
//!     Err(e) => eprintln!("query failed: {e}"),
//! }
//! ```
use std::{mem, time::Duration};

use log::debug;

use crate::{
    connection::{Connection, Endpoint},
    error::{ClientError, ProtocolError},
    protocol::{
        Command, ResponseStatus, SearchResultParser,
        commands::{self, AttributeUpdate, ExcerptOptions, Keyword},
        request,
    },
    query::QueryRequest,
    result::{MatchLayout, SearchResult},
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientConfig {
    pub endpoint: Endpoint,
    /// Bounds the TCP connect only; reads and writes block.
    pub connect_timeout: Option<Duration>,
    pub layout: MatchLayout,
}

pub struct SearchClient {
    conn: Connection,
    layout: MatchLayout,
    queue: Vec<Vec<u8>>,
    last_error: Option<String>,
    last_warning: Option<String>,
    connect_error: bool,
}

impl SearchClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            conn: Connection::new(config.endpoint, config.connect_timeout),
            layout: config.layout,
            queue: Vec::new(),
            last_error: None,
            last_warning: None,
            connect_error: false,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.conn.endpoint()
    }

    pub fn set_server(&mut self, endpoint: Endpoint) -> &mut Self {
        self.conn.set_endpoint(endpoint);
        self
    }

    pub fn set_connect_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.conn.set_timeout(timeout);
        self
    }

    /// `true` keeps every match as returned (see [`MatchLayout::List`]),
    /// `false` collapses matches by document id.
    pub fn set_array_result(&mut self, array: bool) -> &mut Self {
        self.layout = if array {
            MatchLayout::List
        } else {
            MatchLayout::ById
        };
        self
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_warning(&self) -> Option<&str> {
        self.last_warning.as_deref()
    }

    /// Whether the last failure happened while connecting.
    pub fn is_connect_error(&self) -> bool {
        self.connect_error
    }

    /// Number of queries waiting for [`run_queries`](Self::run_queries).
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Opens a persistent connection, reused until [`close`](Self::close).
    pub fn open(&mut self) -> Result<(), ClientError> {
        self.begin();
        let result = self.conn.open_persistent();
        self.finish(result)
    }

    pub fn close(&mut self) -> Result<(), ClientError> {
        self.begin();
        let result = self.conn.close();
        self.finish(result)
    }

    /// Encodes `request` and appends it to the batch. Returns its position,
    /// which is also its index in the [`run_queries`](Self::run_queries)
    /// result.
    pub fn add_query(&mut self, request: &QueryRequest) -> usize {
        self.queue.push(request::encode_query(request));
        debug!("queued query #{}", self.queue.len() - 1);
        self.queue.len() - 1
    }

    /// Sends every queued query in one SEARCH frame.
    ///
    /// The queue is emptied even when the call fails. Per-query failures do
    /// not fail the call; they are reported on the matching
    /// [`SearchResult`].
    pub fn run_queries(&mut self) -> Result<Vec<SearchResult>, ClientError> {
        self.begin();
        if self.queue.is_empty() {
            return self.finish(Err(ClientError::NoQueries));
        }

        let queue = mem::take(&mut self.queue);
        let result = self.search(&queue);
        self.finish(result)
    }

    /// Runs a single query on its own, leaving the batch queue untouched.
    ///
    /// Unlike [`run_queries`](Self::run_queries), a record that is neither
    /// OK nor WARNING fails the call.
    pub fn query(&mut self, request: &QueryRequest) -> Result<SearchResult, ClientError> {
        self.begin();
        let result = self.search(&[request::encode_query(request)]).and_then(|results| {
            let result = results
                .into_iter()
                .next()
                .ok_or(ProtocolError::IncompleteReply)?;

            match result.status() {
                Some(ResponseStatus::Ok | ResponseStatus::Warning) => Ok(result),
                Some(ResponseStatus::Retry) => Err(ClientError::Retry(
                    result.error.unwrap_or_default(),
                )),
                // ERROR and unrecognized status codes
                _ => Err(ClientError::Daemon(result.error.unwrap_or_default())),
            }
        });

        if let Ok(result) = &result {
            if result.warning.is_some() {
                self.last_warning.clone_from(&result.warning);
            }
        }
        self.finish(result)
    }

    /// Highlighted snippets of `docs` for the query `words`, one per
    /// document in the same order.
    pub fn build_excerpts<D: AsRef<[u8]>>(
        &mut self,
        docs: &[D],
        index: &str,
        words: &str,
        opts: &ExcerptOptions,
    ) -> Result<Vec<Vec<u8>>, ClientError> {
        self.begin();
        let result = commands::encode_excerpts(docs, index, words, opts)
            .map_err(ClientError::from)
            .and_then(|body| self.command(Command::Excerpt, &body))
            .and_then(|payload| Ok(commands::parse_excerpts(&payload, docs.len())?));
        self.finish(result)
    }

    /// Tokenizes `query` the way `index` would, optionally with per-keyword
    /// statistics.
    pub fn build_keywords(
        &mut self,
        query: &str,
        index: &str,
        hits: bool,
    ) -> Result<Vec<Keyword>, ClientError> {
        self.begin();
        let body = commands::encode_keywords(query, index, hits);
        let result = self
            .command(Command::Keywords, &body)
            .and_then(|payload| Ok(commands::parse_keywords(&payload, hits)?));
        self.finish(result)
    }

    /// Returns the number of documents updated.
    pub fn update_attributes(&mut self, update: &AttributeUpdate) -> Result<u32, ClientError> {
        self.begin();
        let result = commands::encode_update(update)
            .map_err(ClientError::from)
            .and_then(|body| self.command(Command::Update, &body))
            .and_then(|payload| Ok(commands::parse_update(&payload)?));
        self.finish(result)
    }

    /// Daemon status counters as rows of cells.
    pub fn status(&mut self) -> Result<Vec<Vec<String>>, ClientError> {
        self.begin();
        let result = self
            .command(Command::Status, &commands::encode_status())
            .and_then(|payload| Ok(commands::parse_status(&payload)?));
        self.finish(result)
    }

    /// Forces attribute flush; returns the daemon's flush tag.
    pub fn flush_attributes(&mut self) -> Result<u32, ClientError> {
        self.begin();
        let result = self
            .command(Command::FlushAttrs, &[])
            .and_then(|payload| Ok(commands::parse_flush(&payload)?));
        self.finish(result)
    }

    fn search(&mut self, bodies: &[Vec<u8>]) -> Result<Vec<SearchResult>, ClientError> {
        let payload = self.command(Command::Search, &request::encode_batch(bodies))?;
        Ok(SearchResultParser::new(self.layout).parse(&payload, bodies.len()))
    }

    /// One round trip; a connection-level warning is stored on the session.
    fn command(&mut self, command: Command, body: &[u8]) -> Result<Vec<u8>, ClientError> {
        let reply = self
            .conn
            .request(command, body)?
            .into_reply(command.version())?;
        self.last_warning = reply.warning;
        Ok(reply.payload)
    }

    fn begin(&mut self) {
        self.last_error = None;
        self.last_warning = None;
        self.connect_error = false;
    }

    fn finish<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(e) = &result {
            debug!("operation failed: {e}");
            self.connect_error = e.is_connect_error();
            self.last_error = Some(e.to_string());
        }
        result
    }
}

impl Default for SearchClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}
