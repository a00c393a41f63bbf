//! Connection lifecycle.
//!
//! A [`Connection`] owns at most one open channel to the daemon. In the
//! default mode every command opens a fresh channel, performs the handshake,
//! exchanges one frame and closes it again. After
//! [`open_persistent`](Connection::open_persistent) the channel is kept and
//! reused until [`close`](Connection::close) is called or the daemon hangs up.
//!
//! ```text
//! Disconnected -> Connecting -> HandshakeSent -> Ready -> Closed
//!                                                  ^        |
//!                                                  +--------+  (reconnect)
//! ```
use std::{
    fmt,
    io::{self, Read, Write},
    net::{TcpStream, ToSocketAddrs},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

#[cfg(unix)]
use std::os::unix::net::UnixStream;

use log::{debug, info};

use crate::{
    error::{ClientError, ProtocolError},
    protocol::{CLIENT_PROTOCOL, Command, ProtocolTransport, Response, TransportError, commands},
};

pub const DEFAULT_PORT: u16 = 9312;

/// Where the daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp { host: String, port: u16 },
    Unix(PathBuf),
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::Tcp {
            host: "localhost".into(),
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp { host, port } if host.contains(':') => write!(f, "[{host}]:{port}"),
            Endpoint::Tcp { host, port } => write!(f, "{host}:{port}"),
            Endpoint::Unix(path) => write!(f, "{}", path.display()),
        }
    }
}

impl FromStr for Endpoint {
    type Err = String;

    /// Accepts `unix:///path`, `/path`, `host:port`, `[v6]:port`, bare `host`
    /// and bare IPv6 literals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err("empty unix socket path".into());
            }
            return Ok(Endpoint::Unix(path.into()));
        }
        if s.starts_with('/') {
            return Ok(Endpoint::Unix(s.into()));
        }

        if let Some(bracketed) = s.strip_prefix('[') {
            let (host, rest) = bracketed
                .split_once(']')
                .ok_or_else(|| format!("unclosed '[' in '{s}'"))?;
            if host.is_empty() {
                return Err(format!("missing host in '{s}'"));
            }
            let port = match rest {
                "" => DEFAULT_PORT,
                _ => rest
                    .strip_prefix(':')
                    .ok_or_else(|| format!("unexpected '{rest}' after ']'"))
                    .and_then(parse_port)?,
            };
            return Ok(Endpoint::Tcp {
                host: host.into(),
                port,
            });
        }

        match s.rsplit_once(':') {
            // more than one colon: a bare IPv6 literal, no port
            Some((host, _)) if host.contains(':') => Ok(Endpoint::Tcp {
                host: s.into(),
                port: DEFAULT_PORT,
            }),
            Some((host, port)) if !host.is_empty() => Ok(Endpoint::Tcp {
                host: host.into(),
                port: parse_port(port)?,
            }),
            Some(_) => Err(format!("missing host in '{s}'")),
            None if s.is_empty() => Err("empty server address".into()),
            None => Ok(Endpoint::Tcp {
                host: s.into(),
                port: DEFAULT_PORT,
            }),
        }
    }
}

fn parse_port(port: &str) -> Result<u16, String> {
    port.parse().map_err(|_| format!("invalid port '{port}'"))
}

/// An open byte stream to the daemon.
#[derive(Debug)]
pub enum Channel {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Channel {
    pub fn open(endpoint: &Endpoint, timeout: Option<Duration>) -> Result<Self, TransportError> {
        match endpoint {
            Endpoint::Tcp { host, port } => {
                let addrs = (host.as_str(), *port)
                    .to_socket_addrs()
                    .map_err(|source| TransportError::Resolve {
                        host: host.clone(),
                        source,
                    })?;

                let mut last = None;
                for addr in addrs {
                    debug!("connecting to {addr}");
                    let stream = match timeout {
                        Some(t) => TcpStream::connect_timeout(&addr, t),
                        None => TcpStream::connect(addr),
                    };
                    match stream {
                        Ok(stream) => return Ok(Channel::Tcp(stream)),
                        Err(e) => last = Some(e),
                    }
                }

                Err(match last {
                    Some(e) => TransportError::from_connect(e),
                    None => TransportError::Resolve {
                        host: host.clone(),
                        source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
                    },
                })
            }
            #[cfg(unix)]
            Endpoint::Unix(path) => UnixStream::connect(path)
                .map(Channel::Unix)
                .map_err(TransportError::from_connect),
            #[cfg(not(unix))]
            Endpoint::Unix(_) => Err(TransportError::Io(io::Error::new(
                io::ErrorKind::Unsupported,
                "unix sockets are not available on this platform",
            ))),
        }
    }

    /// Checks that the peer has not hung up and nothing unread is pending.
    ///
    /// TCP peeks without consuming. Unix sockets have no stable peek in std,
    /// so they read one byte instead. That read is destructive, but it only
    /// succeeds when a byte was pending, and then the probe fails and the
    /// caller drops the channel, so the lost byte is never observed.
    pub fn is_alive(&mut self) -> bool {
        if self.set_nonblocking(true).is_err() {
            return false;
        }

        // EOF or pending bytes both mean the channel is unusable
        let mut buf = [0; 1];
        let probe = match self {
            Channel::Tcp(s) => s.peek(&mut buf),
            #[cfg(unix)]
            Channel::Unix(s) => s.read(&mut buf),
        };
        let alive = matches!(probe, Err(e) if e.kind() == io::ErrorKind::WouldBlock);

        self.set_nonblocking(false).is_ok() && alive
    }

    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        match self {
            Channel::Tcp(s) => s.set_nonblocking(nonblocking),
            #[cfg(unix)]
            Channel::Unix(s) => s.set_nonblocking(nonblocking),
        }
    }
}

impl Read for Channel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Channel::Tcp(s) => s.read(buf),
            #[cfg(unix)]
            Channel::Unix(s) => s.read(buf),
        }
    }
}

impl Write for Channel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Channel::Tcp(s) => s.write(buf),
            #[cfg(unix)]
            Channel::Unix(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Channel::Tcp(s) => s.flush(),
            #[cfg(unix)]
            Channel::Unix(s) => s.flush(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    HandshakeSent,
    Ready,
    Closed,
}

pub struct Connection {
    endpoint: Endpoint,
    timeout: Option<Duration>,
    transport: Option<ProtocolTransport<Channel>>,
    persistent: bool,
    state: ConnectionState,
}

impl Connection {
    pub fn new(endpoint: Endpoint, timeout: Option<Duration>) -> Self {
        Self {
            endpoint,
            timeout,
            transport: None,
            persistent: false,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Takes effect on the next connect.
    pub fn set_endpoint(&mut self, endpoint: Endpoint) {
        self.endpoint = endpoint;
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    fn transition(&mut self, state: ConnectionState) {
        debug!("connection {}: {:?} -> {:?}", self.endpoint, self.state, state);
        self.state = state;
    }

    /// Opens a channel and runs the handshake. The client version is written
    /// before anything is read.
    pub fn connect(&mut self) -> Result<(), ClientError> {
        self.transition(ConnectionState::Connecting);

        let channel = match Channel::open(&self.endpoint, self.timeout) {
            Ok(channel) => channel,
            Err(source) => {
                self.transition(ConnectionState::Disconnected);
                return Err(ClientError::Connect {
                    location: self.endpoint.to_string(),
                    source,
                });
            }
        };

        match handshake(ProtocolTransport::new(channel), |s| self.transition(s)) {
            Ok(transport) => {
                info!("connected to {}", self.endpoint);
                self.transport = Some(transport);
                self.transition(ConnectionState::Ready);
                Ok(())
            }
            Err(e) => {
                self.transition(ConnectionState::Closed);
                Err(e)
            }
        }
    }

    /// Reuses a live persistent channel or opens a new one.
    pub fn ensure_connected(&mut self) -> Result<(), ClientError> {
        if let Some(transport) = self.transport.as_mut() {
            if transport.get_mut().is_alive() {
                self.transition(ConnectionState::Ready);
                return Ok(());
            }
            info!("connection to {} was closed by peer, reconnecting", self.endpoint);
            self.transport = None;
            self.transition(ConnectionState::Closed);
        }
        self.connect()
    }

    /// Switches to persistent mode: the daemon keeps the channel open across
    /// commands. The PERSIST frame has no reply.
    pub fn open_persistent(&mut self) -> Result<(), ClientError> {
        if self.persistent && self.transport.is_some() {
            return Err(ClientError::AlreadyConnected);
        }
        self.ensure_connected()?;

        let sent = match self.transport.as_mut() {
            Some(transport) => transport.write_request(Command::Persist, &commands::encode_persist()),
            None => return Err(ClientError::NotConnected),
        };
        if let Err(e) = sent {
            self.drop_channel();
            return Err(e.into());
        }

        self.persistent = true;
        info!("persistent connection to {} opened", self.endpoint);
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), ClientError> {
        if self.transport.is_none() {
            return Err(ClientError::NotConnected);
        }
        self.drop_channel();
        info!("connection to {} closed", self.endpoint);
        Ok(())
    }

    fn drop_channel(&mut self) {
        self.transport = None;
        self.persistent = false;
        self.transition(ConnectionState::Closed);
    }

    /// One command round trip. The channel is closed afterwards unless the
    /// connection is persistent, and always closed on failure.
    pub fn request(&mut self, command: Command, body: &[u8]) -> Result<Response, ClientError> {
        self.ensure_connected()?;

        let result = match self.transport.as_mut() {
            Some(transport) => exchange(transport, command, body),
            None => Err(ClientError::NotConnected),
        };

        if result.is_err() || !self.persistent {
            self.drop_channel();
        }
        result
    }
}

fn handshake<T: Read + Write>(
    mut transport: ProtocolTransport<T>,
    mut on_state: impl FnMut(ConnectionState),
) -> Result<ProtocolTransport<T>, ClientError> {
    transport.write_version(CLIENT_PROTOCOL)?;
    on_state(ConnectionState::HandshakeSent);

    let version = transport.read_version()?;
    debug!("daemon protocol version {version}");
    if version < 1 {
        return Err(ProtocolError::VersionTooOld { version }.into());
    }
    Ok(transport)
}

fn exchange<T: Read + Write>(
    transport: &mut ProtocolTransport<T>,
    command: Command,
    body: &[u8],
) -> Result<Response, ClientError> {
    debug!("sending {command:?} ({} bytes)", body.len());
    transport.write_request(command, body)?;

    let response = transport.read_response()?;
    debug!(
        "received {command:?} response: status={} ver={:#x} len={}",
        response.status,
        response.version,
        response.body.len()
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::{
        io::Cursor,
        net::{TcpListener, TcpStream},
        thread,
    };

    use crate::protocol::frame::read_full;

    use super::*;

    #[test]
    fn endpoint_parsing() {
        assert_eq!(
            "unix:///var/run/searchd.sock".parse(),
            Ok(Endpoint::Unix("/var/run/searchd.sock".into()))
        );
        assert_eq!("/tmp/s.sock".parse(), Ok(Endpoint::Unix("/tmp/s.sock".into())));
        assert_eq!(
            "search.local:9306".parse(),
            Ok(Endpoint::Tcp {
                host: "search.local".into(),
                port: 9306
            })
        );
        assert_eq!(
            "search.local".parse(),
            Ok(Endpoint::Tcp {
                host: "search.local".into(),
                port: DEFAULT_PORT
            })
        );
        assert_eq!(
            "[::1]:9312".parse(),
            Ok(Endpoint::Tcp {
                host: "::1".into(),
                port: 9312
            })
        );
        assert_eq!(
            "[::1]".parse(),
            Ok(Endpoint::Tcp {
                host: "::1".into(),
                port: DEFAULT_PORT
            })
        );
        assert!("host:port".parse::<Endpoint>().is_err());
        assert!(":9312".parse::<Endpoint>().is_err());
        assert!("unix://".parse::<Endpoint>().is_err());
        assert!("".parse::<Endpoint>().is_err());
    }

    #[test]
    fn bare_ipv6_literal_uses_default_port() {
        assert_eq!(
            "::1".parse(),
            Ok(Endpoint::Tcp {
                host: "::1".into(),
                port: DEFAULT_PORT
            })
        );
        assert_eq!(
            "fe80::1:2".parse(),
            Ok(Endpoint::Tcp {
                host: "fe80::1:2".into(),
                port: DEFAULT_PORT
            })
        );
        assert!("[::1".parse::<Endpoint>().is_err());
        assert!("[::1]9312".parse::<Endpoint>().is_err());
        assert!("[]:9312".parse::<Endpoint>().is_err());
        assert!("[::1]:http".parse::<Endpoint>().is_err());
    }

    #[test]
    fn endpoint_display() {
        assert_eq!(Endpoint::default().to_string(), "localhost:9312");
        assert_eq!(Endpoint::Unix("/tmp/s".into()).to_string(), "/tmp/s");

        let v6: Endpoint = "::1".parse().unwrap();
        assert_eq!(v6.to_string(), "[::1]:9312");
        assert_eq!(v6.to_string().parse(), Ok(v6));
    }

    /// Scripted daemon side: reads come from `input`, writes land in `output`.
    struct Scripted {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Scripted {
        fn new(input: Vec<u8>) -> Self {
            Self {
                input: Cursor::new(input),
                output: Vec::new(),
            }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            // the client must have announced itself before it reads
            assert_eq!(self.output, vec![0, 0, 0, 1]);
            self.input.read(buf)
        }
    }

    impl Write for Scripted {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn handshake_writes_before_reading() {
        let transport = handshake(ProtocolTransport::new(Scripted::new(vec![0, 0, 0, 1])), |_| {})
            .unwrap();
        assert_eq!(transport.get_ref().output, vec![0, 0, 0, 1]);
    }

    #[test]
    fn handshake_rejects_version_zero() {
        let mut states = Vec::new();
        let err = handshake(ProtocolTransport::new(Scripted::new(vec![0, 0, 0, 0])), |s| {
            states.push(s)
        })
        .err()
        .unwrap();

        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::VersionTooOld { version: 0 })
        ));
        assert_eq!(states, vec![ConnectionState::HandshakeSent]);
    }

    #[test]
    fn handshake_short_version_word() {
        let err = handshake(ProtocolTransport::new(Scripted::new(vec![0, 0])), |_| {})
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::ShortRead { actual: 2, .. })
        ));
    }

    /// Accepts one connection, checks the client's version word, answers
    /// with `version` and hands the stream to `then`.
    fn daemon<F>(version: u32, then: F) -> (u16, thread::JoinHandle<()>)
    where
        F: FnOnce(TcpStream) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let hello = read_full(&mut stream, 4).unwrap();
            assert_eq!(hello, vec![0, 0, 0, 1]);
            stream.write_all(&version.to_be_bytes()).unwrap();
            then(stream);
        });
        (port, handle)
    }

    fn local(port: u16) -> Endpoint {
        Endpoint::Tcp {
            host: "127.0.0.1".into(),
            port,
        }
    }

    #[test]
    fn tcp_probe() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (mut server, _) = listener.accept().unwrap();
        let mut channel = Channel::Tcp(client);

        assert!(channel.is_alive());
        assert!(channel.is_alive());

        server.write_all(&[7]).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(!channel.is_alive());
        // peeking left the byte in place
        let mut buf = [0; 1];
        channel.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [7]);

        drop(server);
        thread::sleep(Duration::from_millis(50));
        assert!(!channel.is_alive());
    }

    #[cfg(unix)]
    #[test]
    fn unix_probe() {
        let (client, mut server) = UnixStream::pair().unwrap();
        let mut channel = Channel::Unix(client);

        assert!(channel.is_alive());
        assert!(channel.is_alive());

        server.write_all(&[7]).unwrap();
        assert!(!channel.is_alive());

        drop(server);
        assert!(!channel.is_alive());
    }

    #[test]
    fn connect_and_handshake() {
        let (port, handle) = daemon(1, |_| {});
        let mut conn = Connection::new(local(port), Some(Duration::from_secs(5)));

        conn.connect().unwrap();
        assert_eq!(conn.state(), ConnectionState::Ready);
        assert!(conn.is_open());
        conn.close().unwrap();
        assert_eq!(conn.state(), ConnectionState::Closed);
        handle.join().unwrap();
    }

    #[test]
    fn old_daemon_is_rejected() {
        let (port, handle) = daemon(0, |_| {});
        let mut conn = Connection::new(local(port), None);

        let err = conn.connect().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Protocol);
        assert!(!conn.is_open());
        handle.join().unwrap();
    }

    #[test]
    fn refused_connection_is_transport_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut conn = Connection::new(local(port), Some(Duration::from_secs(2)));

        let err = conn.connect().unwrap_err();
        assert!(err.is_connect_error());
        assert_eq!(err.kind(), crate::ErrorKind::Transport);
        assert!(err.to_string().starts_with(&format!("connection to 127.0.0.1:{port} failed")));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn unresolvable_host() {
        let mut conn = Connection::new(
            Endpoint::Tcp {
                host: "no-such-host.invalid".into(),
                port: 9312,
            },
            None,
        );
        match conn.connect() {
            Err(ClientError::Connect {
                source: TransportError::Resolve { host, .. },
                ..
            }) => assert_eq!(host, "no-such-host.invalid"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn close_without_connection() {
        let mut conn = Connection::new(Endpoint::default(), None);
        assert!(matches!(conn.close(), Err(ClientError::NotConnected)));
    }

    #[test]
    fn one_shot_request_closes_channel() {
        let (port, handle) = daemon(1, |mut stream| {
            let header = read_full(&mut stream, 8).unwrap();
            assert_eq!(header, vec![0, 5, 1, 0, 0, 0, 0, 4]);
            assert_eq!(read_full(&mut stream, 4).unwrap(), vec![0, 0, 0, 1]);
            stream
                .write_all(&[0, 0, 1, 0, 0, 0, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0])
                .unwrap();
        });
        let mut conn = Connection::new(local(port), None);

        let resp = conn
            .request(Command::Status, &commands::encode_status())
            .unwrap();
        assert_eq!(resp.status, 0);
        assert_eq!(resp.body, vec![0; 8]);
        assert!(!conn.is_open());
        handle.join().unwrap();
    }

    #[test]
    fn persistent_channel_is_reused() {
        let (port, handle) = daemon(1, |mut stream| {
            let persist = read_full(&mut stream, 12).unwrap();
            assert_eq!(persist, vec![0, 4, 0, 0, 0, 0, 0, 4, 0, 0, 0, 1]);

            for _ in 0..2 {
                let header = read_full(&mut stream, 8).unwrap();
                assert_eq!(header, vec![0, 7, 1, 0, 0, 0, 0, 0]);
                stream
                    .write_all(&[0, 0, 1, 0, 0, 0, 0, 4, 0, 0, 0, 3])
                    .unwrap();
            }
        });
        let mut conn = Connection::new(local(port), None);

        conn.open_persistent().unwrap();
        assert!(conn.is_persistent());
        assert!(matches!(
            conn.open_persistent(),
            Err(ClientError::AlreadyConnected)
        ));

        for _ in 0..2 {
            let resp = conn.request(Command::FlushAttrs, &[]).unwrap();
            assert_eq!(resp.body, vec![0, 0, 0, 3]);
            assert!(conn.is_open());
        }

        conn.close().unwrap();
        assert!(!conn.is_persistent());
        handle.join().unwrap();
    }

    #[test]
    fn dead_persistent_channel_reconnects() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            // first session hangs up right after PERSIST
            let (mut first, _) = listener.accept().unwrap();
            read_full(&mut first, 4).unwrap();
            first.write_all(&[0, 0, 0, 1]).unwrap();
            read_full(&mut first, 12).unwrap();
            drop(first);

            let (mut second, _) = listener.accept().unwrap();
            read_full(&mut second, 4).unwrap();
            second.write_all(&[0, 0, 0, 1]).unwrap();
            read_full(&mut second, 8).unwrap();
            second
                .write_all(&[0, 0, 1, 0, 0, 0, 0, 4, 0, 0, 0, 9])
                .unwrap();
        });
        let mut conn = Connection::new(local(port), None);
        conn.open_persistent().unwrap();

        // wait for the peer to hang up
        thread::sleep(Duration::from_millis(100));

        let resp = conn.request(Command::FlushAttrs, &[]).unwrap();
        assert_eq!(resp.body, vec![0, 0, 0, 9]);
        handle.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn unix_socket_round_trip() {
        use std::os::unix::net::UnixListener;

        use tempdir::TempDir;

        let dir = TempDir::new("sift").unwrap();
        let path = dir.path().join("searchd.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_full(&mut stream, 4).unwrap();
            stream.write_all(&[0, 0, 0, 1]).unwrap();
            read_full(&mut stream, 8).unwrap();
            stream
                .write_all(&[0, 0, 1, 0, 0, 0, 0, 4, 0, 0, 0, 1])
                .unwrap();
        });

        let endpoint: Endpoint = format!("unix://{}", path.display()).parse().unwrap();
        let mut conn = Connection::new(endpoint, None);
        let resp = conn.request(Command::FlushAttrs, &[]).unwrap();
        assert_eq!(resp.body, vec![0, 0, 0, 1]);
        handle.join().unwrap();
    }
}
