use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::debug;

use crate::codec::{ContentCoding, RequestDecoder, ResponseEncoder};
use crate::connection::ConnectionConfig;
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, Request, Response, SendError};

/// Initial capacity of the read buffer
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// An HTTP connection that serves exactly one request
///
/// `HttpConnection` goes through `Reading → Parsed → Responded → Closed`:
/// - Reading and decoding one request, bounded by the configured read timeout
/// - Negotiating the response coding from the request headers, unless the response
///   carries the coding of the request that reached its handler
/// - Calling the handler and writing its response
/// - Shutting down the write side
///
/// A request that cannot be decoded is never answered: the connection is dropped and
/// the parse error is returned to the caller.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    writer: W,
    config: ConnectionConfig,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ConnectionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: ConnectionConfig) -> Self {
        let decoder = RequestDecoder::with_limits(config.max_header_bytes(), config.max_body_bytes());
        Self { framed_read: FramedRead::with_capacity(reader, decoder, READ_BUFFER_SIZE), writer, config }
    }

    /// Runs the single exchange of this connection.
    ///
    /// Returns `Ok(())` when the response was written or when the peer closed without
    /// sending anything.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        let Some(request) = self.read_request().await? else {
            debug!("peer closed before sending a request");
            return Ok(());
        };

        debug!(method = %request.method(), url = request.url(), "receive request");

        // fallback coding, the handler takes the request by value
        let coding = ContentCoding::negotiate(request.headers());
        let response = handler.call(request).await;

        let coding = response.content_coding().unwrap_or(coding);
        debug!(status = response.status().as_u16(), ?coding, "send response");
        self.send_response(response, coding).await?;
        Ok(())
    }

    async fn read_request(&mut self) -> Result<Option<Request>, ParseError> {
        let read_timeout = self.config.read_timeout();
        match timeout(read_timeout, self.framed_read.next()).await {
            Ok(Some(result)) => result.map(Some),
            Ok(None) => Ok(None),
            Err(_elapsed) => Err(ParseError::timeout(read_timeout)),
        }
    }

    async fn send_response(self, response: Response, coding: ContentCoding) -> Result<(), SendError> {
        let mut framed_write = FramedWrite::new(self.writer, ResponseEncoder::new(coding));
        // send flushes, so the whole response is out before the shutdown
        framed_write.send(response).await?;
        framed_write.get_mut().shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::MockHandler;
    use http::StatusCode;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, DuplexStream, duplex, split};
    use tokio::task::JoinHandle;

    fn serve(handler: MockHandler, config: ConnectionConfig) -> (DuplexStream, JoinHandle<Result<(), HttpError>>) {
        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = split(server);
        let connection = HttpConnection::with_config(reader, writer, config);
        let task = tokio::spawn(connection.process(Arc::new(handler)));
        (client, task)
    }

    async fn read_all(client: &mut DuplexStream) -> Vec<u8> {
        let mut buf = Vec::new();
        client.read_to_end(&mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn answers_one_request() {
        let mut handler = MockHandler::new();
        handler
            .expect_call()
            .times(1)
            .returning(|req| Response::ok().header("Content-Type", "text/plain").body(req.url().to_string()));

        let (mut client, task) = serve(handler, ConnectionConfig::default());
        client.write_all(b"GET /echo/abc HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();

        let response = read_all(&mut client).await;
        assert_eq!(&response[..], b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 9\r\n\r\n/echo/abc");
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn waits_for_declared_body() {
        let mut handler = MockHandler::new();
        handler.expect_call().times(1).returning(|req| {
            assert_eq!(&req.body_bytes()[..], b"hello world");
            Response::created()
        });

        let (mut client, task) = serve(handler, ConnectionConfig::default());
        client.write_all(b"POST /files/a HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        client.write_all(b" world").await.unwrap();

        let response = read_all(&mut client).await;
        assert_eq!(&response[..], b"HTTP/1.1 201 Created\r\n\r\n");
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn malformed_request_gets_no_response() {
        let mut handler = MockHandler::new();
        handler.expect_call().never();

        let (mut client, task) = serve(handler, ConnectionConfig::default());
        client.write_all(b"GET\r\n\r\n").await.unwrap();

        assert!(read_all(&mut client).await.is_empty());
        let result = task.await.unwrap();
        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::InvalidRequestLine { .. } })));
    }

    #[tokio::test]
    async fn truncated_body_gets_no_response() {
        let mut handler = MockHandler::new();
        handler.expect_call().never();

        let (mut client, task) = serve(handler, ConnectionConfig::default());
        client.write_all(b"POST /files/a HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc").await.unwrap();
        client.shutdown().await.unwrap();

        assert!(read_all(&mut client).await.is_empty());
        let result = task.await.unwrap();
        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::IncompleteBody { expected: 10, actual: 3 } })));
    }

    #[tokio::test]
    async fn slow_client_times_out() {
        let mut handler = MockHandler::new();
        handler.expect_call().never();

        let config = ConnectionConfig::new().with_read_timeout(Duration::from_millis(50));
        let (mut client, task) = serve(handler, config);
        client.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::Timeout { .. } })));
        assert!(read_all(&mut client).await.is_empty());
    }

    #[tokio::test]
    async fn closed_without_request() {
        let mut handler = MockHandler::new();
        handler.expect_call().never();

        let (mut client, task) = serve(handler, ConnectionConfig::default());
        client.shutdown().await.unwrap();

        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn gzip_when_accepted() {
        let mut handler = MockHandler::new();
        handler.expect_call().times(1).returning(|_req| Response::new(StatusCode::OK).body("hi"));

        let (mut client, task) = serve(handler, ConnectionConfig::default());
        client.write_all(b"GET / HTTP/1.1\r\nAccept-Encoding: deflate, gzip\r\n\r\n").await.unwrap();

        let response = read_all(&mut client).await;
        let head = String::from_utf8_lossy(&response);
        assert!(head.starts_with("HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\nContent-Length: "));
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn huge_content_length_gets_no_response() {
        let mut handler = MockHandler::new();
        handler.expect_call().never();

        let (mut client, task) = serve(handler, ConnectionConfig::default());
        client.write_all(b"POST /files/a HTTP/1.1\r\nContent-Length: 18446744073709551000\r\n\r\nabc").await.unwrap();

        assert!(read_all(&mut client).await.is_empty());
        let result = task.await.unwrap();
        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::TooLargeBody { .. } })));
    }

    #[tokio::test]
    async fn body_over_configured_limit_gets_no_response() {
        let mut handler = MockHandler::new();
        handler.expect_call().never();

        let config = ConnectionConfig::new().with_max_body_bytes(4);
        let (mut client, task) = serve(handler, config);
        client.write_all(b"POST /files/a HTTP/1.1\r\nContent-Length: 1099511627776\r\n\r\nabc").await.unwrap();

        assert!(read_all(&mut client).await.is_empty());
        let result = task.await.unwrap();
        assert!(matches!(
            result,
            Err(HttpError::RequestError { source: ParseError::TooLargeBody { content_length: 1099511627776, max_size: 4 } })
        ));
    }

    #[tokio::test]
    async fn response_coding_wins_over_request_headers() {
        let mut handler = MockHandler::new();
        handler.expect_call().times(1).returning(|_req| {
            let mut response = Response::ok().body("hi");
            response.set_content_coding(ContentCoding::Identity);
            response
        });

        let (mut client, task) = serve(handler, ConnectionConfig::default());
        client.write_all(b"GET / HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n").await.unwrap();

        let response = read_all(&mut client).await;
        assert_eq!(&response[..], b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi");
        assert!(task.await.unwrap().is_ok());
    }
}
