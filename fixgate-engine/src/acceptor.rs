/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! TCP acceptor.
//!
//! Every accepted socket gets its own [`Connection`] on its own task, inside
//! a `connection` span carrying the peer address. Connections never share
//! session state.

use crate::connection::Connection;
use fixgate_core::error::FixError;
use fixgate_session::SessionConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

/// Accepts FIX connections on a bound TCP listener.
#[derive(Debug)]
pub struct Acceptor {
    listener: TcpListener,
    config: Arc<SessionConfig>,
}

impl Acceptor {
    /// Binds a listener on `addr`.
    ///
    /// # Errors
    /// Returns an error if the address cannot be bound.
    pub async fn bind(addr: impl ToSocketAddrs, config: SessionConfig) -> Result<Self, FixError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::from_listener(listener, config))
    }

    /// Wraps an already bound listener.
    #[must_use]
    pub fn from_listener(listener: TcpListener, config: SessionConfig) -> Self {
        Self {
            listener,
            config: Arc::new(config),
        }
    }

    /// Returns the local address the listener is bound to.
    ///
    /// # Errors
    /// Returns an error if the socket address cannot be queried.
    pub fn local_addr(&self) -> Result<SocketAddr, FixError> {
        Ok(self.listener.local_addr()?)
    }

    /// Returns the configuration applied to every accepted session.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Accepts connections until `cancel` fires, then waits for the open
    /// connections to wind down.
    ///
    /// Accept failures are logged and the loop keeps going.
    pub async fn run(self, cancel: CancellationToken) {
        let local = self.listener.local_addr().ok();
        info!(addr = ?local, "accepting FIX connections");
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            warn!(error = %err, "failed to accept connection");
                            continue;
                        }
                    };
                    if let Err(err) = stream.set_nodelay(true) {
                        debug!(error = %err, %peer, "failed to set TCP_NODELAY");
                    }

                    let span = info_span!("connection", %peer);
                    let connection = Connection::new(Arc::clone(&self.config));
                    let cancel = cancel.child_token();
                    connections.spawn(
                        async move {
                            info!("connection accepted");
                            if let Err(err) = connection.run(stream, cancel).await {
                                warn!(error = %err, "connection ended with error");
                            }
                        }
                        .instrument(span),
                    );
                }
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(err) = joined {
                        warn!(error = %err, "connection task failed");
                    }
                }
            }
        }

        info!(open = connections.len(), "acceptor stopping");
        while let Some(joined) = connections.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "connection task failed");
            }
        }
    }
}
