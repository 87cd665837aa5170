//! Blocking request execution over TCP.

use crate::http::Header;
use crate::http::HttpRequest;
use crate::http::HttpResponse;
use crate::http::HttpStatusCode;
use ifx_core::PageError;
use ifx_core::PageResult;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::net::ToSocketAddrs;
use std::time::Duration;

const MAX_RESPONSE_HEAD_BYTES: usize = 64 * 1024;
const MAX_RESPONSE_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Executes one prepared request and yields the parsed response.
///
/// The page runtime issues at most one request per user action, so the
/// trait is deliberately connection-per-request with no pooling.
pub trait Transport {
    fn execute(&mut self, request: &HttpRequest) -> PageResult<HttpResponse>;
}

/// Plain-TCP transport for the local processing endpoint.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    connect_timeout: Duration,
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl TcpTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Transport for TcpTransport {
    fn execute(&mut self, request: &HttpRequest) -> PageResult<HttpResponse> {
        tracing::debug!(
            method = request.method.as_str(),
            target = %request.request_target(),
            "dispatching HTTP request"
        );

        let addresses = resolve_addresses(request.url.host(), request.url.port())?;
        let mut stream = connect_first_available(&addresses, self.connect_timeout)?;

        write_request(&mut stream, request)?;
        read_response(&mut stream)
    }
}

fn resolve_addresses(host: &str, port: u16) -> PageResult<Vec<SocketAddr>> {
    let addresses = (host, port)
        .to_socket_addrs()
        .map_err(|error| {
            PageError::new(
                "net.resolve_failed",
                format!("failed to resolve `{host}:{port}`: {error}"),
            )
        })?
        .collect::<Vec<_>>();

    if addresses.is_empty() {
        return Err(PageError::new(
            "net.no_addresses",
            format!("`{host}:{port}` resolved to no addresses"),
        ));
    }

    Ok(addresses)
}

fn connect_first_available(addresses: &[SocketAddr], timeout: Duration) -> PageResult<TcpStream> {
    let mut last_error: Option<PageError> = None;

    for address in addresses {
        match TcpStream::connect_timeout(address, timeout) {
            Ok(stream) => return Ok(stream),
            Err(error) => {
                last_error = Some(PageError::new(
                    "net.connect_failed",
                    format!("failed to connect to `{address}`: {error}"),
                ));
            }
        }
    }

    match last_error {
        Some(error) => Err(error),
        None => Err(PageError::new(
            "net.no_addresses",
            "no addresses available to open a connection",
        )),
    }
}

fn write_request(stream: &mut dyn Write, request: &HttpRequest) -> PageResult<()> {
    let mut encoded = Vec::new();
    encoded.extend_from_slice(request.method.as_str().as_bytes());
    encoded.push(b' ');
    encoded.extend_from_slice(request.request_target().as_bytes());
    encoded.extend_from_slice(b" HTTP/1.1\r\n");

    for header in &request.headers {
        encoded.extend_from_slice(header.name.as_bytes());
        encoded.extend_from_slice(b": ");
        encoded.extend_from_slice(header.value.as_bytes());
        encoded.extend_from_slice(b"\r\n");
    }
    encoded.extend_from_slice(b"Connection: close\r\n\r\n");
    encoded.extend_from_slice(&request.body);

    stream.write_all(&encoded).map_err(|error| {
        PageError::new(
            "net.write_failed",
            format!("failed to write HTTP request bytes: {error}"),
        )
    })?;
    stream.flush().map_err(|error| {
        PageError::new(
            "net.flush_failed",
            format!("failed to flush HTTP request bytes: {error}"),
        )
    })?;

    Ok(())
}

fn read_response(stream: &mut dyn Read) -> PageResult<HttpResponse> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];
    let mut header_end: Option<usize> = None;

    while header_end.is_none() {
        let read = stream.read(&mut chunk).map_err(|error| {
            PageError::new(
                "net.read_head_failed",
                format!("failed while reading HTTP response head: {error}"),
            )
        })?;

        if read == 0 {
            return Err(PageError::new(
                "net.unexpected_eof",
                "unexpected EOF before response head completed",
            ));
        }

        buffer.extend_from_slice(&chunk[..read]);
        if buffer.len() > MAX_RESPONSE_HEAD_BYTES {
            return Err(PageError::new(
                "net.head_too_large",
                format!("HTTP response head exceeds {MAX_RESPONSE_HEAD_BYTES} bytes"),
            ));
        }

        header_end = find_header_end(&buffer);
    }

    let Some(header_end) = header_end else {
        return Err(PageError::new(
            "net.head_terminator_missing",
            "response head terminator not found",
        ));
    };

    let head_bytes = &buffer[..header_end];
    let mut body = buffer[header_end..].to_vec();
    let head_text = std::str::from_utf8(head_bytes).map_err(|error| {
        PageError::new(
            "net.head_invalid_utf8",
            format!("HTTP response head is not valid UTF-8 text: {error}"),
        )
    })?;

    let mut lines = head_text.split("\r\n");
    let status_line = lines
        .next()
        .ok_or_else(|| PageError::new("net.status_line_missing", "missing HTTP status line"))?;
    let status = parse_status_line(status_line)?;

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (name, value) = line.split_once(':').ok_or_else(|| {
            PageError::new(
                "net.header_invalid",
                format!("invalid HTTP header line `{line}`"),
            )
        })?;
        headers.push(Header::new(name.trim(), value.trim())?);
    }

    if header_contains(&headers, "transfer-encoding", "chunked") {
        return Err(PageError::new(
            "net.transfer_encoding_unsupported",
            "chunked responses are not supported by this transport",
        ));
    }

    match parse_content_length(&headers)? {
        Some(len) => {
            if len > MAX_RESPONSE_BODY_BYTES {
                return Err(PageError::new(
                    "net.body_too_large",
                    format!("declared body of {len} bytes exceeds the response limit"),
                ));
            }
            if body.len() < len {
                let remaining = len - body.len();
                let mut rest = vec![0_u8; remaining];
                stream.read_exact(&mut rest).map_err(|error| {
                    PageError::new(
                        "net.read_body_failed",
                        format!("failed to read HTTP body bytes: {error}"),
                    )
                })?;
                body.extend_from_slice(&rest);
            } else if body.len() > len {
                body.truncate(len);
            }
        }
        None => {
            // Connection: close is requested on every request, so reading
            // to EOF delimits the body.
            let mut tail = Vec::new();
            stream
                .take(MAX_RESPONSE_BODY_BYTES as u64)
                .read_to_end(&mut tail)
                .map_err(|error| {
                    PageError::new(
                        "net.read_body_failed",
                        format!("failed while draining response body: {error}"),
                    )
                })?;
            body.extend_from_slice(&tail);
        }
    }

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn parse_status_line(line: &str) -> PageResult<HttpStatusCode> {
    let mut parts = line.split_ascii_whitespace();
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/1.") {
        return Err(PageError::new(
            "net.version_unsupported",
            format!("unsupported HTTP version in status line `{line}`"),
        ));
    }

    let code = parts
        .next()
        .and_then(|raw| raw.parse::<u16>().ok())
        .ok_or_else(|| {
            PageError::new(
                "net.status_line_invalid",
                format!("malformed HTTP status line `{line}`"),
            )
        })?;

    HttpStatusCode::new(code)
}

fn parse_content_length(headers: &[Header]) -> PageResult<Option<usize>> {
    let Some(raw) = headers
        .iter()
        .find(|header| header.name.eq_ignore_ascii_case("content-length"))
        .map(|header| header.value.as_str())
    else {
        return Ok(None);
    };

    raw.trim().parse::<usize>().map(Some).map_err(|error| {
        PageError::new(
            "net.content_length_invalid",
            format!("invalid Content-Length `{raw}`: {error}"),
        )
    })
}

fn header_contains(headers: &[Header], name: &str, needle: &str) -> bool {
    headers
        .iter()
        .filter(|header| header.name.eq_ignore_ascii_case(name))
        .any(|header| {
            header
                .value
                .split(',')
                .any(|token| token.trim().eq_ignore_ascii_case(needle))
        })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|idx| idx + 4)
}
