//! The accept loop tying a [`Router`] to TCP connections.
//!
//! Every accepted connection runs in its own task and carries exactly one exchange:
//! the request is decoded, routed, passed through the composed middleware chain and
//! answered, then the connection is closed. Requests nothing matches go to the
//! not-found handler, wrapped by the root middlewares.

use std::fmt;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use async_trait::async_trait;
use burrow_http::connection::{ConnectionConfig, HttpConnection};
use burrow_http::handler::{Handler, SharedHandler, make_handler, negotiate_coding};
use burrow_http::protocol::{HttpError, Request, RequestTarget, Response};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::middleware::Middleware;
use crate::router::Router;

pub const DEFAULT_PORT: u16 = 4221;

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,

    #[error("invalid address: {source}")]
    InvalidAddress {
        #[from]
        source: io::Error,
    },
}

pub struct ServerBuilder {
    router: Option<Router>,
    address: Option<io::Result<Vec<SocketAddr>>>,
    connection_config: ConnectionConfig,
    not_found_handler: Option<SharedHandler>,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: None, address: None, connection_config: ConnectionConfig::default(), not_found_handler: None }
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Address to bind, defaults to `0.0.0.0:4221`. Resolution errors surface from
    /// [`build`](Self::build).
    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(|addrs| addrs.collect()));
        self
    }

    pub fn connection_config(mut self, connection_config: ConnectionConfig) -> Self {
        self.connection_config = connection_config;
        self
    }

    /// Handler for requests no route matches, defaults to an empty `404 Not Found`.
    pub fn not_found_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.not_found_handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;

        let address = match self.address {
            Some(resolved) => resolved?,
            None => vec![SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT))],
        };
        if address.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing").into());
        }

        let not_found_handler = self
            .not_found_handler
            .unwrap_or_else(|| -> SharedHandler { Arc::new(make_handler(|_req: Request| async { Response::not_found() })) });
        let not_found_handler = router.root_middlewares().decorate(negotiate_coding(not_found_handler));

        Ok(Server { router, not_found_handler, address, connection_config: self.connection_config })
    }
}

impl fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("router", &self.router)
            .field("address", &self.address)
            .field("connection_config", &self.connection_config)
            .finish_non_exhaustive()
    }
}

pub struct Server {
    router: Router,
    not_found_handler: SharedHandler,
    address: Vec<SocketAddr>,
    connection_config: ConnectionConfig,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    /// Binds the configured address and serves until Ctrl-C.
    pub async fn start(self) -> io::Result<()> {
        info!(address = ?self.address, "start listening");
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e);
            }
        };

        let shutdown = CancellationToken::new();
        let ctrl_c_token = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("received ctrl-c, shutting down"),
                Err(e) => error!(cause = %e, "unable to listen for ctrl-c, shutting down"),
            }
            ctrl_c_token.cancel();
        });

        self.serve(tcp_listener, shutdown).await;
        Ok(())
    }

    /// Serves `tcp_listener` until `shutdown` is cancelled, then waits for the connections
    /// in flight.
    pub async fn serve(self, tcp_listener: TcpListener, shutdown: CancellationToken) {
        let server = Arc::new(self);
        let tracker = TaskTracker::new();

        loop {
            let (tcp_stream, remote_addr) = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = tcp_listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
            };

            let server = Arc::clone(&server);
            tracker.spawn(async move {
                server.serve_connection(tcp_stream, remote_addr).await;
            });
        }

        tracker.close();
        debug!(in_flight = tracker.len(), "stop accepting, waiting for connections");
        tracker.wait().await;
        info!("server stopped");
    }

    async fn serve_connection(self: Arc<Self>, tcp_stream: TcpStream, remote_addr: SocketAddr) {
        let (reader, writer) = tcp_stream.into_split();
        let connection = HttpConnection::with_config(reader, writer, self.connection_config);

        match connection.process(self).await {
            Ok(()) => debug!(%remote_addr, "finished process, connection shutdown"),
            Err(HttpError::RequestError { source }) => {
                warn!(%remote_addr, cause = %source, "bad request, connection dropped without response")
            }
            Err(HttpError::ResponseError { source }) => {
                error!(%remote_addr, cause = %source, "failed to send response, connection shutdown")
            }
        }
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("router", &self.router)
            .field("address", &self.address)
            .field("connection_config", &self.connection_config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler for Server {
    async fn call(&self, req: Request) -> Response {
        let target = RequestTarget::parse(req.url());
        let (handler, path_params) = self.router.at(req.method(), target.segments()).into_parts();
        let query_params = target.into_query();

        let handler = handler.unwrap_or_else(|| {
            debug!(method = %req.method(), url = req.url(), "no route matched");
            &self.not_found_handler
        });

        handler.call(req.with_params(path_params, query_params)).await
    }
}
