//! Tests for the HTTP server implementation.

#[cfg(test)]
mod server_tests {
    use std::io::{self, Cursor};
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
    use tokio::net::{TcpListener, TcpStream};

    use crate::parser::Method;
    use crate::server::{HttpServer, ServerConfig, HttpResponse, StatusCode, Error};

    // Mock TcpStream that hands out at most `max_read` bytes per read
    struct MockTcpStream {
        read_data: Cursor<Vec<u8>>,
        write_data: Vec<u8>,
        max_read: usize,
    }

    impl MockTcpStream {
        fn new(read_data: Vec<u8>) -> Self {
            Self::chunked(read_data, usize::MAX)
        }

        fn chunked(read_data: Vec<u8>, max_read: usize) -> Self {
            Self {
                read_data: Cursor::new(read_data),
                write_data: Vec::new(),
                max_read,
            }
        }

        fn written(&self) -> String {
            String::from_utf8_lossy(&self.write_data).into_owned()
        }
    }

    impl AsyncRead for MockTcpStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            let unfilled = buf.initialize_unfilled();
            let limit = unfilled.len().min(this.max_read);
            let n = std::io::Read::read(&mut this.read_data, &mut unfilled[..limit])?;
            buf.advance(n);
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for MockTcpStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            let this = self.get_mut();
            this.write_data.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    async fn echo_server() -> HttpServer {
        let server = HttpServer::new(ServerConfig::default());

        server.add_route("/items", vec![Method::GET], |_req| async {
            Ok(HttpResponse::text(StatusCode::Ok, "all items"))
        }).await;

        server.add_route("/items/{id}", vec![Method::GET, Method::PUT], |req| async move {
            let id = req.param("id").unwrap_or_default().to_string();
            let body = String::from_utf8_lossy(&req.body).into_owned();
            Ok(HttpResponse::text(StatusCode::Ok, format!("{} item {id}: {body}", req.method)))
        }).await;

        server.add_route("/broken", vec![Method::GET], |_req| async {
            Err(Error::IoError(io::Error::other("handler exploded")))
        }).await;

        server
    }

    async fn run(server: &HttpServer, stream: &mut MockTcpStream) -> Result<(), Error> {
        HttpServer::handle_connection(stream, server.routes.clone(), &server.config).await
    }

    #[tokio::test]
    async fn test_server_creation() {
        let config = ServerConfig {
            addr: "127.0.0.1:9090".parse().unwrap(),
            max_connections: 100,
            read_buffer_size: 4096,
            max_request_size: 64 * 1024,
        };

        let server = HttpServer::new(config.clone());
        assert_eq!(server.config.addr, config.addr);
        assert_eq!(server.config.max_connections, 100);
        assert!(server.routes.read().await.is_empty());
    }

    #[test]
    fn test_default_config_listens_on_8080() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.port(), 8080);
        assert!(config.addr.ip().is_unspecified());
        assert_eq!(config.max_connections, 1024);
    }

    #[tokio::test]
    async fn test_add_route() {
        let server = echo_server().await;
        let routes = server.routes.read().await;
        assert_eq!(routes.len(), 3);
        assert_eq!(routes.routes()[1].pattern.as_str(), "/items/{id}");
        assert_eq!(routes.routes()[1].methods, vec![Method::GET, Method::PUT]);
    }

    #[tokio::test]
    async fn test_handle_connection_with_valid_request() {
        let server = echo_server().await;
        let mut stream = MockTcpStream::new(b"GET /items HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());

        let result = run(&server, &mut stream).await;

        assert!(result.is_ok());
        let response = stream.written();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Connection: close\r\n"));
        assert!(response.ends_with("all items"));
    }

    #[tokio::test]
    async fn test_query_string_is_ignored_for_routing() {
        let server = echo_server().await;
        let mut stream = MockTcpStream::new(b"GET /items?limit=5 HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());

        assert!(run(&server, &mut stream).await.is_ok());
        assert!(stream.written().ends_with("all items"));
    }

    #[tokio::test]
    async fn test_path_parameter_reaches_handler() {
        let server = echo_server().await;
        let request = b"PUT /items/42 HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
        let mut stream = MockTcpStream::new(request.to_vec());

        assert!(run(&server, &mut stream).await.is_ok());
        assert!(stream.written().ends_with("PUT item 42: hello"));
    }

    #[tokio::test]
    async fn test_body_split_across_reads() {
        let server = echo_server().await;
        let request = b"PUT /items/7 HTTP/1.1\r\nHost: localhost\r\nContent-Length: 11\r\n\r\nhello world";
        let mut stream = MockTcpStream::chunked(request.to_vec(), 5);

        assert!(run(&server, &mut stream).await.is_ok());
        assert!(stream.written().ends_with("PUT item 7: hello world"));
    }

    #[tokio::test]
    async fn test_read_split_inside_multibyte_character() {
        let server = echo_server().await;
        let request = "GET /items/é HTTP/1.1\r\nHost: localhost\r\n\r\n".as_bytes();
        // "GET /items/" is 11 bytes; the first read ends after the 0xC3 lead byte.
        assert_eq!(request[11], 0xC3);
        let mut stream = MockTcpStream::chunked(request.to_vec(), 12);

        let result = run(&server, &mut stream).await;

        assert!(result.is_ok(), "{result:?}");
        let response = stream.written();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("GET item é: "));
    }

    #[tokio::test]
    async fn test_handle_connection_with_not_found() {
        let server = echo_server().await;
        let mut stream = MockTcpStream::new(b"GET /nonexistent HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());

        let result = run(&server, &mut stream).await;

        assert!(matches!(result, Err(Error::NotFound(ref route)) if route == "GET /nonexistent"));
        let response = stream.written();
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.ends_with("404 page not found"));
    }

    #[tokio::test]
    async fn test_unregistered_method_falls_through_to_not_found() {
        let server = echo_server().await;
        let mut stream = MockTcpStream::new(b"DELETE /items/1 HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());

        let result = run(&server, &mut stream).await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(stream.written().starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_invalid_request() {
        let server = echo_server().await;
        let mut stream = MockTcpStream::new(b"INVALID REQUEST".to_vec());

        let result = run(&server, &mut stream).await;

        assert!(matches!(result, Err(Error::ParseError(_))));
        let response = stream.written();
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(response.contains("Error parsing request:"));
    }

    #[tokio::test]
    async fn test_truncated_body_is_bad_request() {
        let server = echo_server().await;
        let request = b"PUT /items/1 HTTP/1.1\r\nHost: localhost\r\nContent-Length: 50\r\n\r\nshort";
        let mut stream = MockTcpStream::new(request.to_vec());

        let result = run(&server, &mut stream).await;

        assert!(matches!(result, Err(Error::ParseError(_))));
        assert!(stream.written().starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn test_request_too_large() {
        let mut server = echo_server().await;
        server.config.read_buffer_size = 16;
        server.config.max_request_size = 64;

        let body = "x".repeat(200);
        let request = format!("PUT /items/1 HTTP/1.1\r\nHost: localhost\r\nContent-Length: 200\r\n\r\n{body}");
        let mut stream = MockTcpStream::new(request.into_bytes());

        let result = run(&server, &mut stream).await;

        assert!(matches!(result, Err(Error::RequestTooLarge(64))));
        assert!(stream.written().starts_with("HTTP/1.1 413 Payload Too Large\r\n"));
    }

    #[tokio::test]
    async fn test_handler_error_is_internal_server_error() {
        let server = echo_server().await;
        let mut stream = MockTcpStream::new(b"GET /broken HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());

        let result = run(&server, &mut stream).await;

        assert!(matches!(result, Err(Error::IoError(_))));
        let response = stream.written();
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(response.contains("handler exploded"));
    }

    #[tokio::test]
    async fn test_closed_connection_writes_nothing() {
        let server = echo_server().await;
        let mut stream = MockTcpStream::new(Vec::new());

        assert!(run(&server, &mut stream).await.is_ok());
        assert!(stream.written().is_empty());
    }

    #[tokio::test]
    async fn test_serve_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server_task = tokio::spawn(async move {
            let server = echo_server().await;
            server.serve(listener).await
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /items/5 HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        let mut response = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), client.read_to_end(&mut response))
            .await
            .expect("server did not close the connection")
            .unwrap();

        let response = String::from_utf8_lossy(&response);
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("GET item 5: "));

        server_task.abort();
    }

    #[tokio::test]
    async fn test_serve_rejects_over_connection_limit() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server_task = tokio::spawn(async move {
            let mut server = echo_server().await;
            server.config.max_connections = 0;
            server.serve(listener).await
        });

        // The rejection is written on accept, before any request is read.
        // Sending nothing keeps unread bytes from turning the close into a reset.
        let mut client = TcpStream::connect(addr).await.unwrap();

        let mut response = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), client.read_to_end(&mut response))
            .await
            .expect("server did not close the connection")
            .unwrap();

        let response = String::from_utf8_lossy(&response);
        assert!(response.starts_with("HTTP/1.1 503 Service Unavailable\r\n"));
        assert!(response.ends_with("Server is at capacity, please try again later"));

        server_task.abort();
    }
}
