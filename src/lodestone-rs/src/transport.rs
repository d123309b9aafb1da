//! Blocking HTTP/1.1 transport that writes the request line by hand.
//!
//! General purpose HTTP clients parse the request target into a URL, which
//! percent-encodes some characters and collapses `.`/`..` segments. Document
//! ids are allowed to contain all of those, so the request is assembled here
//! byte for byte instead.

use bytes::Bytes;
use http::header::{
    HeaderName, HeaderValue, CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING,
};
use http::{HeaderMap, StatusCode};
use lodestone_core::{
    ClientConfig, Error, Result, Transport, TransportRequest, TransportResponse,
};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Port used when the host carries none
const DEFAULT_PORT: u16 = 80;

/// Upper bound for a status, header or chunk-size line
const MAX_LINE_LEN: u64 = 64 * 1024;

/// Upper bound for the status line plus headers
const MAX_HEAD_LEN: usize = 64 * 1024;

/// Header slots handed to httparse
const MAX_HEADERS: usize = 64;

/// One TCP connection per request, closed before `send` returns
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new()
            .with_connect_timeout(config.connect_timeout())
            .with_read_timeout(config.read_timeout())
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout.filter(|timeout| !timeout.is_zero());
        self
    }

    /// Applies to reads and writes on the socket
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout.filter(|timeout| !timeout.is_zero());
        self
    }

    fn connect(&self, host: &str) -> Result<TcpStream> {
        let mut last_error = None;

        for addr in socket_address(host).to_socket_addrs()? {
            let attempt = match self.connect_timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };

            match attempt {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }

        Err(Error::Transport(last_error.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no address resolved for {}", host),
            )
        })))
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse> {
        validate_target(&request.target)?;

        let mut stream = self.connect(&request.host)?;
        stream.set_read_timeout(self.read_timeout)?;
        stream.set_write_timeout(self.read_timeout)?;

        stream.write_all(&encode_head(request))?;
        if let Some(body) = &request.body {
            stream.write_all(body)?;
        }
        stream.flush()?;

        // The stream is owned by the reader and dropped with it on every path
        let mut reader = BufReader::new(stream);
        read_response(&mut reader)
    }
}

/// `host[:port]` with the default port filled in; bare IPv6 gets brackets
fn socket_address(host: &str) -> String {
    let has_port = match host.rfind(']') {
        Some(end) => host[end..].contains(':'),
        None => host.matches(':').count() == 1,
    };

    if has_port {
        host.to_string()
    } else if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, DEFAULT_PORT)
    } else {
        format!("{}:{}", host, DEFAULT_PORT)
    }
}

/// Whitespace or control bytes would split the request line
fn validate_target(target: &str) -> Result<()> {
    if target.is_empty() {
        return Err(Error::InvalidArgument("request target is empty".to_string()));
    }

    if target.bytes().any(|b| b.is_ascii_whitespace() || b.is_ascii_control()) {
        return Err(Error::InvalidArgument(format!(
            "request target contains whitespace or control characters: {:?}",
            target
        )));
    }

    Ok(())
}

fn encode_head(request: &TransportRequest) -> Vec<u8> {
    let mut head = Vec::with_capacity(256 + request.target.len());

    head.extend_from_slice(request.method.as_str().as_bytes());
    head.push(b' ');
    head.extend_from_slice(request.target.as_bytes());
    head.extend_from_slice(b" HTTP/1.1\r\n");

    write_header(&mut head, HOST.as_str(), request.host.as_bytes());
    for (name, value) in &request.headers {
        if *name == HOST || *name == CONTENT_LENGTH || *name == CONNECTION {
            continue;
        }
        write_header(&mut head, name.as_str(), value.as_bytes());
    }
    if request.body.is_some() {
        write_header(
            &mut head,
            CONTENT_LENGTH.as_str(),
            request.content_length().to_string().as_bytes(),
        );
    }
    write_header(&mut head, CONNECTION.as_str(), b"close");

    head.extend_from_slice(b"\r\n");
    head
}

fn write_header(head: &mut Vec<u8>, name: &str, value: &[u8]) {
    head.extend_from_slice(name.as_bytes());
    head.extend_from_slice(b": ");
    head.extend_from_slice(value);
    head.extend_from_slice(b"\r\n");
}

fn read_response<R: BufRead>(reader: &mut R) -> Result<TransportResponse> {
    loop {
        let (status, headers) = read_head(reader)?;

        // 100 Continue and friends precede the real response
        if status.is_informational() {
            continue;
        }

        let body = read_body(reader, status, &headers)?;
        tracing::debug!("Read response: {} ({} bytes)", status, body.len());

        return Ok(TransportResponse {
            status,
            headers,
            body: Bytes::from(body),
        });
    }
}

/// Buffers whole lines up to the blank line so no body bytes are consumed
fn read_head<R: BufRead>(reader: &mut R) -> Result<(StatusCode, HeaderMap)> {
    let mut head = Vec::new();

    loop {
        let line = read_line(reader)?;
        head.extend_from_slice(&line);
        if head.len() > MAX_HEAD_LEN {
            return Err(Error::InvalidResponse("response head too large".to_string()));
        }

        if is_blank(&line) {
            if let Some(parsed) = parse_head(&head)? {
                return Ok(parsed);
            }
        }
    }
}

/// `None` while httparse still reports the head as partial
fn parse_head(head: &[u8]) -> Result<Option<(StatusCode, HeaderMap)>> {
    let mut slots = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut response = httparse::Response::new(&mut slots);

    match response.parse(head) {
        Ok(httparse::Status::Complete(_)) => {}
        Ok(httparse::Status::Partial) => return Ok(None),
        Err(e) => {
            return Err(Error::InvalidResponse(format!(
                "malformed response head: {}",
                e
            )))
        }
    }

    let code = response
        .code
        .ok_or_else(|| Error::InvalidResponse("missing status code".to_string()))?;
    let status = StatusCode::from_u16(code)
        .map_err(|_| Error::InvalidResponse(format!("invalid status code: {}", code)))?;

    let mut headers = HeaderMap::with_capacity(response.headers.len());
    for header in response.headers.iter() {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|e| Error::InvalidResponse(format!("invalid header name: {}", e)))?;
        let value = HeaderValue::from_bytes(header.value)
            .map_err(|e| Error::InvalidResponse(format!("invalid header value: {}", e)))?;
        headers.append(name, value);
    }

    Ok(Some((status, headers)))
}

/// One raw line, terminator included
fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    let read = reader.by_ref().take(MAX_LINE_LEN).read_until(b'\n', &mut line)?;

    if read == 0 {
        return Err(Error::InvalidResponse(
            "connection closed before the response was complete".to_string(),
        ));
    }
    if line.last() != Some(&b'\n') {
        return Err(Error::InvalidResponse("response line too long".to_string()));
    }
    Ok(line)
}

fn is_blank(line: &[u8]) -> bool {
    line == b"\r\n" || line == b"\n"
}

/// Appends exactly `len` bytes, or fails if the stream ends first
fn read_exact_len<R: BufRead>(reader: &mut R, len: u64, body: &mut Vec<u8>) -> Result<()> {
    let read = reader.by_ref().take(len).read_to_end(body)?;
    if read as u64 != len {
        return Err(Error::InvalidResponse(format!(
            "body ended after {} of {} bytes",
            read, len
        )));
    }
    Ok(())
}

fn read_body<R: BufRead>(
    reader: &mut R,
    status: StatusCode,
    headers: &HeaderMap,
) -> Result<Vec<u8>> {
    if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        return Ok(Vec::new());
    }

    let chunked = headers
        .get_all(TRANSFER_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.to_ascii_lowercase().contains("chunked"));
    if chunked {
        return read_chunked(reader);
    }

    let mut body = Vec::new();
    if let Some(length) = headers.get(CONTENT_LENGTH) {
        let length: u64 = length
            .to_str()
            .ok()
            .and_then(|length| length.trim().parse().ok())
            .ok_or_else(|| Error::InvalidResponse("invalid Content-Length".to_string()))?;

        read_exact_len(reader, length, &mut body)?;
        return Ok(body);
    }

    reader.read_to_end(&mut body)?;
    Ok(body)
}

fn read_chunked<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut body = Vec::new();

    loop {
        let line = read_line(reader)?;
        let size = match httparse::parse_chunk_size(&line) {
            Ok(httparse::Status::Complete((_, size))) => size,
            _ => {
                return Err(Error::InvalidResponse(format!(
                    "invalid chunk size: {}",
                    String::from_utf8_lossy(line.trim_ascii_end())
                )))
            }
        };

        if size == 0 {
            // Skip trailers
            while !is_blank(&read_line(reader)?) {}
            return Ok(body);
        }

        (body.len() as u64)
            .checked_add(size)
            .ok_or_else(|| Error::InvalidResponse("chunked body too large".to_string()))?;
        read_exact_len(reader, size, &mut body)?;

        if !is_blank(&read_line(reader)?) {
            return Err(Error::InvalidResponse(
                "chunk not terminated by CRLF".to_string(),
            ));
        }
    }
}
