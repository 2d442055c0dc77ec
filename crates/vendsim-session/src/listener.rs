use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::event::EventSource;
use crate::session::{Session, SessionConfig};

/// Accepts controller connections.
///
/// Each accepted connection is served as an independent [`Session`]; no
/// state is shared across connections.
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind a TCP listener.
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self> {
        let inner = TcpListener::bind(addr)?;
        Ok(Self { inner })
    }

    /// Bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }

    /// Accept the next connection.
    pub fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        Ok(self.inner.accept()?)
    }

    /// Accept the next connection and start a session on it.
    pub fn accept_session(
        &self,
        dispatcher: Arc<dyn Dispatcher>,
        events: Box<dyn EventSource>,
        config: SessionConfig,
    ) -> Result<Session> {
        let (stream, peer) = self.accept()?;
        tracing::info!(%peer, "connection accepted");
        Session::spawn(stream, dispatcher, events, config)
    }
}
