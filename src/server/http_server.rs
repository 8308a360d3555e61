//! HTTP server implementation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{RwLock, Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio::signal;
use log::{debug, error, info, warn};

use crate::parser::{HttpRequest, Method, parse_request};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::response::{HttpResponse, StatusCode};
use crate::server::router::{HandlerFuture, Router};

/// An HTTP server.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The route table.
    pub routes: Arc<RwLock<Router>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            routes: Arc::new(RwLock::new(Router::new())),
        }
    }

    /// Add a route to the server.
    ///
    /// `pattern` may contain `{name}` segments; their values are available
    /// to the handler through [`HttpRequest::param`].
    pub async fn add_route<F, Fut>(&self, pattern: &str, methods: Vec<Method>, handler: F)
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        let handler = Arc::new(move |req: HttpRequest| -> HandlerFuture { Box::pin(handler(req)) });
        self.routes.write().await.add(pattern, methods, handler);
    }

    /// Log the registered endpoints.
    async fn display_server_info(&self) {
        let routes = self.routes.read().await;
        info!("Registered endpoints:");
        for route in routes.routes() {
            let methods = route.methods.iter()
                .map(Method::as_str)
                .collect::<Vec<&str>>()
                .join(", ");
            info!("  {methods} {}", route.pattern);
        }
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown_tx: mpsc::Sender<()>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        })
    }

    /// Handle a new connection.
    async fn handle_new_connection(
        &self,
        mut socket: TcpStream,
        addr: SocketAddr,
        semaphore: &Arc<Semaphore>,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let response = HttpResponse::text(
                    StatusCode::ServiceUnavailable,
                    "Server is at capacity, please try again later",
                );
                let _ = socket.write_all(&response.to_bytes()).await;
                return;
            }
        };

        let routes = self.routes.clone();
        let config = self.config.clone();

        tasks.spawn(async move {
            // The permit is dropped when the task completes, releasing the semaphore slot
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, routes, &config).await {
                match &e {
                    // Client-side problems; the response has already been sent.
                    Error::ParseError(_) | Error::NotFound(_) | Error::RequestTooLarge(_) => {
                        debug!("Request from {addr} rejected: {e}");
                    }
                    _ => error!("Error handling connection from {addr}: {e}"),
                }
            }
            let _ = socket.shutdown().await;
        });
    }

    /// Wait for in-flight connections, giving up after 30 seconds.
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let shutdown_timeout = tokio::time::Duration::from_secs(30);
        let drained = tokio::time::timeout(shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        }).await;

        if drained.is_err() {
            warn!("Shutdown timeout elapsed, aborting {len} connections", len = tasks.len());
            tasks.abort_all();
        }

        info!("Server shutdown complete");
    }

    /// Bind to the configured address and serve until Ctrl+C.
    ///
    /// Failing to bind is returned to the caller; it is the only fatal error.
    pub async fn start(&self) -> Result<(), Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener until Ctrl+C.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Error> {
        self.display_server_info().await;
        info!("Server listening on http://{addr}", addr = listener.local_addr()?);

        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let ctrl_c = Self::setup_ctrl_c_handler(shutdown_tx);

        let mut tasks = JoinSet::new();

        loop {
            // Reap finished connection tasks so the set does not grow unbounded.
            while let Some(res) = tasks.try_join_next() {
                if let Err(e) = res {
                    error!("Connection task failed: {e}");
                }
            }

            tokio::select! {
                Some(()) = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            debug!("Connection from {addr}");
                            self.handle_new_connection(socket, addr, &semaphore, &mut tasks).await;
                        }
                        Err(e) => {
                            // Usually transient (e.g. out of file descriptors); back off briefly.
                            error!("Error accepting connection: {e}");
                            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                        }
                    }
                }
            }
        }

        ctrl_c.abort();
        Self::perform_shutdown(&mut tasks).await;

        Ok(())
    }

    /// Read one full request from the socket.
    ///
    /// Returns `Ok(None)` if the peer closed the connection before sending
    /// anything.
    async fn read_request(
        socket: &mut (impl AsyncRead + Unpin),
        config: &ServerConfig,
    ) -> Result<Option<HttpRequest>, Error> {
        let mut buf = Vec::new();
        let mut chunk = vec![0; config.read_buffer_size.max(1)];

        loop {
            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                if buf.is_empty() {
                    return Ok(None);
                }
                // Peer is done sending; whatever we have must parse as-is.
                return Ok(Some(parse_request(&buf)?));
            }

            buf.extend_from_slice(&chunk[..n]);

            match parse_request(&buf) {
                Ok(request) => return Ok(Some(request)),
                Err(e) if e.is_incomplete() => {
                    if buf.len() >= config.max_request_size {
                        return Err(Error::RequestTooLarge(config.max_request_size));
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Handle a single connection: read one request, route it, write the response.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        routes: Arc<RwLock<Router>>,
        config: &ServerConfig,
    ) -> Result<(), Error> {
        let mut request = match Self::read_request(&mut *socket, config).await {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(()), // Connection closed
            Err(Error::ParseError(e)) => {
                let response = HttpResponse::text(
                    StatusCode::BadRequest,
                    format!("Error parsing request: {e}"),
                );
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::ParseError(e));
            }
            Err(Error::RequestTooLarge(limit)) => {
                let response = HttpResponse::text(
                    StatusCode::PayloadTooLarge,
                    format!("Request exceeds {limit} bytes"),
                );
                socket.write_all(&response.to_bytes()).await?;
                return Err(Error::RequestTooLarge(limit));
            }
            Err(e) => return Err(e),
        };

        let method = request.method;
        let path = request.route_path().to_string();

        // Release the route table before awaiting the handler.
        let handler = {
            let router = routes.read().await;
            router
                .find(method, &path)
                .map(|(route, params)| (route.handler.clone(), params))
        };

        let Some((handler, params)) = handler else {
            debug!("{method} {path} -> 404 (no route)");
            let response = HttpResponse::text(StatusCode::NotFound, "404 page not found");
            socket.write_all(&response.to_bytes()).await?;
            return Err(Error::NotFound(format!("{method} {path}")));
        };

        request.params = params;
        let response = match handler(request).await {
            Ok(response) => response,
            Err(e) => {
                let response = HttpResponse::text(
                    StatusCode::InternalServerError,
                    format!("Internal server error: {e}"),
                );
                socket.write_all(&response.to_bytes()).await?;
                return Err(e);
            }
        };

        debug!("{method} {path} -> {status}", status = response.status.as_u16());
        socket.write_all(&response.to_bytes()).await?;
        socket.flush().await?;

        Ok(())
    }
}
