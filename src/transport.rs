//! Transport capability interface and the TCP implementation.
//!
//! The handler only needs three capabilities from a transport: establish a
//! fresh connection, write one payload, and tear the connection down (covered
//! by `Drop` on the connection value). A fourth, the interrupter, exists so a
//! forced shutdown can unblock a send that is stuck inside the worker thread.

use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Default bound on establishing a single TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Factory for outbound connections to the collector.
pub trait Transport: Send {
    /// Establish a fresh connection. Errors surface to the reconnect loop,
    /// or to the caller for the very first connection at construction time.
    fn connect(&mut self) -> io::Result<Box<dyn Connection>>;
}

/// One live outbound connection.
///
/// Dropping the value closes the connection.
pub trait Connection: Send {
    /// Write one serialized payload to the peer.
    fn send(&mut self, payload: &[u8]) -> io::Result<()>;

    /// Handle capable of aborting a send blocked in another thread.
    ///
    /// A connection whose send was interrupted is discarded, never reused;
    /// the stream may hold a half-written payload.
    fn interrupter(&self) -> Box<dyn Interrupt>;
}

/// Unblocks an in-flight send from outside the worker thread.
pub trait Interrupt: Send + Sync {
    fn interrupt(&self);
}

/// Plain TCP transport.
#[derive(Clone, Debug)]
pub struct TcpTransport {
    host: String,
    port: u16,
    connect_timeout: Duration,
}

impl TcpTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Override the per-attempt connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn socket_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map(|iter| iter.collect())
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self) -> io::Result<Box<dyn Connection>> {
        let mut last_err = None;
        for addr in self.socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    return Ok(Box::new(TcpConnection { stream }));
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no addresses resolved for {}:{}", self.host, self.port),
            )
        }))
    }
}

struct TcpConnection {
    stream: TcpStream,
}

impl Connection for TcpConnection {
    fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        self.stream.write_all(payload)?;
        self.stream.flush()
    }

    fn interrupter(&self) -> Box<dyn Interrupt> {
        Box::new(TcpInterrupt {
            stream: self.stream.try_clone().ok(),
        })
    }
}

struct TcpInterrupt {
    // `try_clone` can fail; an interrupter without a handle is a no-op and
    // the shutdown path falls back to abandoning the connection.
    stream: Option<TcpStream>,
}

impl Interrupt for TcpInterrupt {
    fn interrupt(&self) {
        if let Some(stream) = &self.stream {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}
