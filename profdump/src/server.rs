//! OTLP/HTTP profiles receiver
//!
//! Accepts `POST /v1development/profiles` with a protobuf
//! `ExportProfilesServiceRequest` body, renders it, and writes the formatted
//! report to the configured output. Each request is rendered on its own; the
//! output lock is only held while writing a finished report, so concurrent
//! requests never interleave their text.

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use log::{error, info, warn};
use profdump_common::proto::ExportProfilesServiceResponse;
use prost::Message;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use crate::config::RenderConfig;
use crate::domain::ServeError;
use crate::ingest::{decode_request_with_encoding, render};
use crate::report::{write_report, OutputFormat};

/// OTLP/HTTP path for profile exports
pub const EXPORT_PATH: &str = "/v1development/profiles";

/// Largest submission body accepted, before any decompression
pub const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024 * 1024;

const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// Shared, read-only receiver configuration plus the report sink
pub struct ServerState {
    config: RenderConfig,
    format: OutputFormat,
    max_body_bytes: usize,
    output: Mutex<Box<dyn Write + Send>>,
}

impl ServerState {
    /// State that writes reports to stdout
    pub fn new(config: RenderConfig, format: OutputFormat) -> Self {
        Self::with_output(config, format, Box::new(std::io::stdout()))
    }

    pub fn with_output(config: RenderConfig, format: OutputFormat, output: Box<dyn Write + Send>) -> Self {
        Self { config, format, max_body_bytes: MAX_REQUEST_BODY_BYTES, output: Mutex::new(output) }
    }

    /// Override [`MAX_REQUEST_BODY_BYTES`]; larger bodies get `413 Payload Too Large`
    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Build the receiver's router
pub fn router(state: Arc<ServerState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);
    Router::new().route(EXPORT_PATH, post(export_profiles)).layer(body_limit).with_state(state)
}

/// Bind `addr` and serve until Ctrl-C or SIGTERM.
///
/// In-flight requests are allowed to finish before this returns.
///
/// # Errors
/// Returns [`ServeError`] if binding or serving fails
pub async fn serve(addr: SocketAddr, state: ServerState) -> Result<(), ServeError> {
    let listener = TcpListener::bind(addr).await.map_err(|source| ServeError::Bind { addr, source })?;
    info!("Listening on http://{}{EXPORT_PATH}", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(state))).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Receiver stopped");
    Ok(())
}

async fn export_profiles(State(state): State<Arc<ServerState>>, headers: HeaderMap, body: Bytes) -> Response {
    let gzip = headers
        .get(header::CONTENT_ENCODING)
        .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"gzip"));

    let report = match decode_request_with_encoding(&body, gzip).and_then(|request| render(&request, &state.config)) {
        Ok(report) => report,
        Err(e) => {
            error!("Rejected submission ({} bytes): {e}", body.len());
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };
    info!("Rendered {} resource profile(s), {} profile(s)", report.resources.len(), report.profiles().count());

    let mut rendered = Vec::new();
    if let Err(e) = write_report(&report, state.format, &mut rendered) {
        error!("Failed to format report: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if let Err(e) = write_output(&state, &rendered) {
        // The submission itself was fine; losing our own output is not the client's problem
        warn!("Failed to write report: {e}");
    }

    let response = ExportProfilesServiceResponse::default().encode_to_vec();
    ([(header::CONTENT_TYPE, PROTOBUF_CONTENT_TYPE)], response).into_response()
}

fn write_output(state: &ServerState, rendered: &[u8]) -> std::io::Result<()> {
    let mut output = state.output.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    output.write_all(rendered)?;
    output.flush()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Ctrl+C received, shutting down"),
        () = terminate => info!("SIGTERM received, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use profdump_common::proto::{
        ExportProfilesServiceRequest, Profile, ProfilesDictionary, ResourceProfiles, Sample, ScopeProfiles,
    };

    /// Write sink the test can read back after the handler is done
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn state(buffer: &SharedBuffer) -> Arc<ServerState> {
        Arc::new(ServerState::with_output(RenderConfig::default(), OutputFormat::Text, Box::new(buffer.clone())))
    }

    fn request_bytes() -> Vec<u8> {
        ExportProfilesServiceRequest {
            resource_profiles: vec![ResourceProfiles {
                scope_profiles: vec![ScopeProfiles {
                    profiles: vec![Profile {
                        samples: vec![Sample { timestamps_unix_nano: vec![1000], ..Default::default() }],
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            dictionary: Some(ProfilesDictionary {
                string_table: vec![String::new()],
                stack_table: vec![Default::default()],
                ..Default::default()
            }),
        }
        .encode_to_vec()
    }

    #[tokio::test]
    async fn test_export_renders_and_acknowledges() {
        let buffer = SharedBuffer::default();
        let response = export_profiles(State(state(&buffer)), HeaderMap::new(), Bytes::from(request_bytes())).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], PROTOBUF_CONTENT_TYPE);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());

        let text = buffer.contents();
        assert!(text.contains("------------------- New Sample --------------------"));
        assert!(text.contains("  Timestamp[0]: 1000 ("));
    }

    /// Serve `router(state)` on an ephemeral port and POST `body` over a fresh connection
    async fn post_over_http(state: Arc<ServerState>, body: &[u8]) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router(state)).await });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let head = format!(
            "POST {EXPORT_PATH} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: {PROTOBUF_CONTENT_TYPE}\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).await.unwrap();
        stream.write_all(body).await.unwrap();

        // A rejected body may end in a reset after the response; keep what arrived
        let mut response = Vec::new();
        if let Err(e) = stream.read_to_end(&mut response).await {
            assert!(!response.is_empty(), "no response before {e}");
        }
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_submission_over_axum_default_limit_is_accepted() {
        let mut request = ExportProfilesServiceRequest::decode(request_bytes().as_slice()).unwrap();
        if let Some(dictionary) = request.dictionary.as_mut() {
            dictionary.string_table.push("x".repeat(3 * 1024 * 1024));
        }
        let body = request.encode_to_vec();
        assert!(body.len() > 2 * 1024 * 1024);

        let buffer = SharedBuffer::default();
        let response = post_over_http(state(&buffer), &body).await;

        assert!(response.starts_with("HTTP/1.1 200"), "unexpected response: {}", &response[..response.len().min(80)]);
        assert!(buffer.contents().contains("Timestamp[0]: 1000"));
    }

    #[tokio::test]
    async fn test_body_over_limit_is_rejected_before_rendering() {
        let buffer = SharedBuffer::default();
        let state = ServerState::with_output(RenderConfig::default(), OutputFormat::Text, Box::new(buffer.clone()))
            .with_max_body_bytes(1024);

        let response = post_over_http(Arc::new(state), &[0u8; 4096]).await;

        assert!(response.starts_with("HTTP/1.1 413"), "unexpected response: {response}");
        assert!(buffer.contents().is_empty());
    }

    #[tokio::test]
    async fn test_export_accepts_gzip_content_encoding() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&request_bytes()).unwrap();
        let body = encoder.finish().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_ENCODING, "gzip".parse().unwrap());

        let buffer = SharedBuffer::default();
        let response = export_profiles(State(state(&buffer)), headers, Bytes::from(body)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(buffer.contents().contains("Timestamp[0]: 1000"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let buffer = SharedBuffer::default();
        let response = export_profiles(State(state(&buffer)), HeaderMap::new(), Bytes::from_static(&[0xff, 0xff])).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(buffer.contents().is_empty());
    }

    #[tokio::test]
    async fn test_missing_dictionary_is_rejected() {
        let mut request = ExportProfilesServiceRequest::decode(request_bytes().as_slice()).unwrap();
        request.dictionary = None;
        let body = request.encode_to_vec();

        let buffer = SharedBuffer::default();
        let response = export_profiles(State(state(&buffer)), HeaderMap::new(), Bytes::from(body)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "Request carries profiles but no dictionary");
    }
}
