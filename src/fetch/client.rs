//! Minimal HTTP client for the cluster metadata APIs.
//!
//! HTTP/1.1 `GET` over `std::net::TcpStream`, one connection per request.
//! `https://` endpoints need the "tls" feature, which brings in rustls.
//!
//! # Design Notes
//!
//! - `Connection: close` framing; the body ends at EOF
//! - Chunked transfer encoding is decoded
//! - Network errors, 5xx and 429 are retried with exponential backoff
//! - Other statuses are returned to the caller as they are

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::IndexDocError;

/// Scheme, host, port and base path of a cluster endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub tls: bool,
    pub host: String,
    pub port: u16,
    /// Path prefix without trailing slash (empty for the root)
    pub base_path: String,
}

impl Endpoint {
    /// Parse `http://host[:port][/base]` or `https://...`.
    ///
    /// A bare `host[:port]` is taken as plain HTTP.
    pub fn parse(url: &str) -> Result<Self, IndexDocError> {
        let invalid = |message: &str| IndexDocError::Parse {
            context: format!("endpoint '{}'", url),
            message: message.to_string(),
        };

        let (tls, rest) = if let Some(rest) = url.strip_prefix("https://") {
            (true, rest)
        } else if let Some(rest) = url.strip_prefix("http://") {
            (false, rest)
        } else if url.contains("://") {
            return Err(invalid("unsupported scheme"));
        } else {
            (false, url)
        };

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| invalid("invalid port"))?;
                (host, port)
            }
            None => (authority, if tls { 443 } else { 9200 }),
        };

        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        Ok(Endpoint {
            tls,
            host: host.to_string(),
            port,
            base_path: path.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL of `path` below this endpoint
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}://{}:{}{}{}",
            if self.tls { "https" } else { "http" },
            self.host,
            self.port,
            self.base_path,
            path
        )
    }

    fn request_path(&self, path: &str) -> String {
        let full = format!("{}{}", self.base_path, path);
        if full.is_empty() {
            "/".to_string()
        } else {
            full
        }
    }
}

/// HTTP response from the server
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase of the status line ("Unauthorized")
    pub status_text: String,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: String,
}

impl HttpResponse {
    /// Check if the response indicates success (2xx status)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value by name (case-insensitive)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Configuration for HTTP requests
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connection and write timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Maximum retry attempts
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            connect_timeout_ms: 10000,
            read_timeout_ms: 30000,
            max_retries: 2,
            retry_delay_ms: 500,
        }
    }
}

/// Error below the HTTP layer (connect, read, TLS, malformed response)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Simple HTTP client
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpConfig) -> Self {
        HttpClient { config }
    }

    /// `GET path` below `endpoint`, retrying transient failures.
    pub fn get(&self, endpoint: &Endpoint, path: &str) -> Result<HttpResponse, TransportError> {
        let mut last_error = None;
        let mut delay = self.config.retry_delay_ms;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    url = %endpoint.url(path),
                    attempt,
                    max_retries = self.config.max_retries,
                    delay_ms = delay,
                    "retrying request"
                );
                std::thread::sleep(Duration::from_millis(delay));
                delay = next_delay(delay);
            }

            match self.do_get(endpoint, path) {
                // Retry on 5xx errors (server errors) and 429 (rate limit)
                Ok(response) if response.status >= 500 || response.status == 429 => {
                    if attempt == self.config.max_retries {
                        return Ok(response);
                    }
                    last_error = Some(TransportError(format!(
                        "HTTP {} {}",
                        response.status, response.status_text
                    )));
                }
                Ok(response) => return Ok(response),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| TransportError("Unknown error".to_string())))
    }

    fn do_get(&self, endpoint: &Endpoint, path: &str) -> Result<HttpResponse, TransportError> {
        let mut stream = self.connect(endpoint)?;
        let request = build_request(&endpoint.host, &endpoint.request_path(path));

        if endpoint.tls {
            self.do_get_tls(endpoint, &mut stream, &request)
        } else {
            stream
                .write_all(request.as_bytes())
                .map_err(|e| TransportError(format!("Write failed: {}", e)))?;
            read_response(&mut stream)
        }
    }

    fn connect(&self, endpoint: &Endpoint) -> Result<TcpStream, TransportError> {
        use std::net::ToSocketAddrs;

        let addr = format!("{}:{}", endpoint.host, endpoint.port);
        let timeout = Duration::from_millis(self.config.connect_timeout_ms);
        let mut last_error = TransportError(format!("Could not resolve {}", addr));

        let addrs = addr
            .to_socket_addrs()
            .map_err(|e| TransportError(format!("Could not resolve {}: {}", addr, e)))?;

        for socket_addr in addrs {
            match TcpStream::connect_timeout(&socket_addr, timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(Duration::from_millis(self.config.read_timeout_ms)))
                        .ok();
                    stream.set_write_timeout(Some(timeout)).ok();
                    return Ok(stream);
                }
                Err(e) => last_error = TransportError(format!("Connection failed: {}", e)),
            }
        }

        Err(last_error)
    }

    #[cfg(feature = "tls")]
    fn do_get_tls(
        &self,
        endpoint: &Endpoint,
        tcp_stream: &mut TcpStream,
        request: &str,
    ) -> Result<HttpResponse, TransportError> {
        use std::sync::Arc;

        let root_store = rustls::RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };

        let config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let server_name = rustls::pki_types::ServerName::try_from(endpoint.host.clone())
            .map_err(|_| TransportError(format!("Invalid server name: {}", endpoint.host)))?;

        let mut conn = rustls::ClientConnection::new(Arc::new(config), server_name)
            .map_err(|e| TransportError(format!("TLS setup failed: {}", e)))?;

        let mut tls_stream = rustls::Stream::new(&mut conn, tcp_stream);

        tls_stream
            .write_all(request.as_bytes())
            .map_err(|e| TransportError(format!("TLS write failed: {}", e)))?;

        read_response(&mut tls_stream)
    }

    #[cfg(not(feature = "tls"))]
    fn do_get_tls(
        &self,
        endpoint: &Endpoint,
        _tcp_stream: &mut TcpStream,
        _request: &str,
    ) -> Result<HttpResponse, TransportError> {
        Err(TransportError(format!(
            "{} needs TLS; rebuild with the \"tls\" feature",
            endpoint.url("")
        )))
    }
}

/// Exponential backoff step; saturates instead of overflowing
fn next_delay(delay: u64) -> u64 {
    delay.saturating_mul(2)
}

fn build_request(host: &str, path: &str) -> String {
    format!(
        "GET {} HTTP/1.1\r\n\
         Host: {}\r\n\
         Accept: application/json\r\n\
         User-Agent: index-doc/{}\r\n\
         Connection: close\r\n\
         \r\n",
        path,
        host,
        env!("CARGO_PKG_VERSION")
    )
}

fn read_response<R: Read>(reader: &mut R) -> Result<HttpResponse, TransportError> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                if buffer.is_empty() {
                    return Err(TransportError("Read timeout".to_string()));
                }
                break;
            }
            // TLS peers may close without close_notify
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(TransportError(format!("Read failed: {}", e))),
        }
    }

    parse_response(&buffer)
}

fn parse_response(buffer: &[u8]) -> Result<HttpResponse, TransportError> {
    // Find header/body separator
    let header_end = find(buffer, b"\r\n\r\n")
        .ok_or_else(|| TransportError("Invalid HTTP response: no header/body separator".to_string()))?;

    let header_section = std::str::from_utf8(&buffer[..header_end])
        .map_err(|_| TransportError("Invalid HTTP response: headers are not UTF-8".to_string()))?;
    let raw_body = &buffer[header_end + 4..];

    let mut lines = header_section.lines();
    let status_line = lines
        .next()
        .ok_or_else(|| TransportError("Empty response".to_string()))?;
    let (status, status_text) = parse_status_line(status_line)?;

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect();

    let mut response = HttpResponse {
        status,
        status_text,
        headers,
        body: String::new(),
    };

    let chunked = response
        .get_header("transfer-encoding")
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));
    let body = if chunked {
        decode_chunked(raw_body)?
    } else {
        let length = response
            .get_header("content-length")
            .and_then(|v| v.parse::<usize>().ok());
        match length {
            Some(length) if length < raw_body.len() => raw_body[..length].to_vec(),
            _ => raw_body.to_vec(),
        }
    };

    response.body = String::from_utf8(body)
        .map_err(|e| TransportError(format!("Response body is not valid UTF-8: {}", e)))?;
    Ok(response)
}

/// Offset of the first occurrence of `needle` in `haystack`
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn parse_status_line(line: &str) -> Result<(u16, String), TransportError> {
    // Format: "HTTP/1.1 401 Unauthorized"
    let mut parts = line.splitn(3, ' ');
    let _version = parts.next();
    let code = parts
        .next()
        .ok_or_else(|| TransportError(format!("Invalid status line: {}", line)))?;
    let status = code
        .parse()
        .map_err(|_| TransportError(format!("Invalid status code: {}", code)))?;
    let text = parts.next().unwrap_or("").trim().to_string();
    Ok((status, text))
}

/// Decode a chunked body. Chunk sizes count bytes, so this works on the
/// raw bytes and leaves UTF-8 decoding to the caller.
fn decode_chunked(body: &[u8]) -> Result<Vec<u8>, TransportError> {
    let mut result = Vec::with_capacity(body.len());
    let mut remaining = body;

    loop {
        let size_end = find(remaining, b"\r\n")
            .ok_or_else(|| TransportError("Invalid chunked encoding".to_string()))?;

        let size_line = std::str::from_utf8(&remaining[..size_end])
            .map_err(|_| TransportError("Invalid chunk size line".to_string()))?;
        // Chunk extensions follow a ';'
        let size_str = size_line.split(';').next().unwrap_or("");
        let chunk_size = usize::from_str_radix(size_str.trim(), 16)
            .map_err(|_| TransportError(format!("Invalid chunk size: {}", size_str)))?;

        if chunk_size == 0 {
            break;
        }

        let chunk_start = size_end + 2;
        let chunk_end = chunk_start.saturating_add(chunk_size);

        if chunk_end > remaining.len() {
            // Incomplete chunk, take what we have
            result.extend_from_slice(&remaining[chunk_start.min(remaining.len())..]);
            break;
        }

        result.extend_from_slice(&remaining[chunk_start..chunk_end]);
        remaining = remaining.get(chunk_end + 2..).unwrap_or(&[]);
    }

    Ok(result)
}
