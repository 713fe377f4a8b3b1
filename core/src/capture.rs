//! Capture clients for the HTML-to-PDF and screenshot services.
//!
//! # Design
//! Both services share one wire contract: POST a flattened JSON body to a
//! single endpoint and get back either a JSON record (`json: true`) or the
//! artifact bytes. `CaptureClient` implements that contract once, generic over
//! a `CaptureService` marker that supplies the endpoint, default base path and
//! option type.
//!
//! Every operation is split like the rest of the crate: `build_capture`
//! produces an `HttpRequest`, `parse_result` / `parse_raw` consume an
//! `HttpResponse`. The `capture_*` methods run both halves through the
//! client's transport.
//!
//! Error policy is status-driven in both modes: any status >= 300 is an
//! `ApiError::Service`, whatever the body decodes to.

use std::io::Cursor;
use std::marker::PhantomData;

use image::DynamicImage;
use serde::Serialize;
use tracing::warn;

use crate::client::BaseClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::options::{HtmlToPdfOptions, ScreenshotOptions};
use crate::types::{CallPayload, CaptureResult, ErrorBody, OutputMode, Target};

/// Static description of a capture service.
pub trait CaptureService {
    type Options: Serialize + Default + Clone + std::fmt::Debug;

    /// Versioned root of the public API.
    const DEFAULT_BASE_PATH: &'static str;
    /// Endpoint path relative to the base path.
    const ENDPOINT: &'static str;
}

/// HTML/URL to PDF, API v5.
#[derive(Debug, Clone, Copy)]
pub struct HtmlToPdf;

impl CaptureService for HtmlToPdf {
    type Options = HtmlToPdfOptions;
    const DEFAULT_BASE_PATH: &'static str = "https://restpack.io/api/html2pdf/v5";
    const ENDPOINT: &'static str = "/convert";
}

/// HTML/URL to image, API v3.
#[derive(Debug, Clone, Copy)]
pub struct Screenshot;

impl CaptureService for Screenshot {
    type Options = ScreenshotOptions;
    const DEFAULT_BASE_PATH: &'static str = "https://restpack.io/api/screenshot/v3";
    const ENDPOINT: &'static str = "/capture";
}

pub type HtmlToPdfClient<T = UreqTransport> = CaptureClient<HtmlToPdf, T>;
pub type ScreenshotClient<T = UreqTransport> = CaptureClient<Screenshot, T>;

pub struct CaptureClient<S, T = UreqTransport> {
    base: BaseClient<T>,
    _service: PhantomData<fn() -> S>,
}

impl<S, T> std::fmt::Debug for CaptureClient<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureClient").field("base", &self.base).finish()
    }
}

impl<S: CaptureService> CaptureClient<S, UreqTransport> {
    /// Client for the public service using a default ureq agent.
    pub fn new(access_token: &str) -> Self {
        Self::from_config(&ClientConfig::new(access_token))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(UreqTransport::with_timeout(config.timeout), config)
    }
}

impl<S: CaptureService, T: Transport> CaptureClient<S, T> {
    pub fn with_transport(transport: T, config: &ClientConfig) -> Self {
        let base_path = config.base_path.as_deref().unwrap_or(S::DEFAULT_BASE_PATH);
        Self {
            base: BaseClient::new(transport, &config.access_token, base_path),
            _service: PhantomData,
        }
    }

    pub fn base(&self) -> &BaseClient<T> {
        &self.base
    }

    pub fn build_capture(&self, target: &Target, options: &S::Options, mode: OutputMode) -> Result<HttpRequest, ApiError> {
        let payload = CallPayload {
            options,
            json: mode == OutputMode::Json,
            target,
        };
        let body = serde_json::to_string(&payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut request = self.base.request(HttpMethod::Post, S::ENDPOINT);
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }

    pub fn parse_result(&self, response: HttpResponse) -> Result<CaptureResult, ApiError> {
        check_status(&response)?;
        serde_json::from_slice(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn parse_raw(&self, response: HttpResponse) -> Result<Vec<u8>, ApiError> {
        check_status(&response)?;
        Ok(response.body)
    }

    /// Render `target` and return the structured record for the hosted artifact.
    pub fn capture(&self, target: &Target, options: &S::Options) -> Result<CaptureResult, ApiError> {
        let request = self.build_capture(target, options, OutputMode::Json)?;
        self.parse_result(self.base.send(request)?)
    }

    /// Render `target` and return the artifact bytes.
    pub fn capture_raw(&self, target: &Target, options: &S::Options) -> Result<Vec<u8>, ApiError> {
        let request = self.build_capture(target, options, OutputMode::Raw)?;
        self.parse_raw(self.base.send(request)?)
    }

    pub fn capture_url(&self, url: &str, options: &S::Options) -> Result<CaptureResult, ApiError> {
        self.capture(&Target::url(url), options)
    }

    pub fn capture_html(&self, html: &str, options: &S::Options) -> Result<CaptureResult, ApiError> {
        self.capture(&Target::html(html), options)
    }

    pub fn capture_url_to_stream(&self, url: &str, options: &S::Options) -> Result<Cursor<Vec<u8>>, ApiError> {
        self.capture_raw(&Target::url(url), options).map(Cursor::new)
    }

    pub fn capture_html_to_stream(&self, html: &str, options: &S::Options) -> Result<Cursor<Vec<u8>>, ApiError> {
        self.capture_raw(&Target::html(html), options).map(Cursor::new)
    }
}

impl<T: Transport> CaptureClient<Screenshot, T> {
    /// Decode a raw-mode response as a PNG or JPEG image.
    pub fn parse_image(&self, response: HttpResponse) -> Result<DynamicImage, ApiError> {
        let content_type = response.header("content-type").map(str::to_string);
        let bytes = self.parse_raw(response)?;
        image::load_from_memory(&bytes).map_err(|e| match content_type {
            Some(content_type) => ApiError::ImageDecode(format!("{e} (content-type: {content_type})")),
            None => ApiError::ImageDecode(e.to_string()),
        })
    }

    pub fn capture_url_to_image(&self, url: &str, options: &ScreenshotOptions) -> Result<DynamicImage, ApiError> {
        self.capture_image(&Target::url(url), options)
    }

    pub fn capture_html_to_image(&self, html: &str, options: &ScreenshotOptions) -> Result<DynamicImage, ApiError> {
        self.capture_image(&Target::html(html), options)
    }

    fn capture_image(&self, target: &Target, options: &ScreenshotOptions) -> Result<DynamicImage, ApiError> {
        let request = self.build_capture(target, options, OutputMode::Raw)?;
        self.parse_image(self.base.send(request)?)
    }
}

/// Map status >= 300 to `ApiError::Service` with the best message available:
/// the JSON `error` field, then the body text, then the status line.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_slice::<ErrorBody>(&response.body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.is_empty())
        .or_else(|| {
            std::str::from_utf8(&response.body)
                .ok()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| status_line(response.status));
    warn!(status = response.status, %message, "capture rejected by service");
    Err(ApiError::Service {
        status: response.status,
        message,
    })
}

fn status_line(status: u16) -> String {
    match ureq::http::StatusCode::from_u16(status).ok().and_then(|s| s.canonical_reason()) {
        Some(reason) => format!("{status} {reason}"),
        None => format!("HTTP {status}"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::sync::Mutex;

    use super::*;
    use crate::client::ACCESS_TOKEN_HEADER;

    const INVALID_TOKEN: &str = "The access token is invalid or you are not subscribed to any plan. Please visit the API console and choose your subscription plan.";

    /// Replays one canned response and records the request it was given.
    struct Canned {
        response: HttpResponse,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn new(status: u16, body: &[u8]) -> Self {
            Self {
                response: HttpResponse {
                    status,
                    headers: Vec::new(),
                    body: body.to_vec(),
                },
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_body(&self) -> serde_json::Value {
            let seen = self.seen.lock().unwrap();
            let body = seen.last().unwrap().body.as_deref().unwrap();
            serde_json::from_str(body).unwrap()
        }
    }

    impl Transport for Canned {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn pdf_client(transport: Canned) -> HtmlToPdfClient<Canned> {
        CaptureClient::with_transport(transport, &ClientConfig::new("tok"))
    }

    fn screenshot_client(transport: Canned) -> ScreenshotClient<Canned> {
        CaptureClient::with_transport(transport, &ClientConfig::new("tok"))
    }

    fn tiny_png() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::new(2, 3));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn build_capture_targets_service_endpoint() {
        let client = pdf_client(Canned::new(200, b"{}"));
        let req = client
            .build_capture(&Target::url("https://example.com"), &HtmlToPdfOptions::default(), OutputMode::Json)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "https://restpack.io/api/html2pdf/v5/convert");
        assert_eq!(req.header(ACCESS_TOKEN_HEADER), Some("tok"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"json": true, "url": "https://example.com"}));
    }

    #[test]
    fn screenshot_uses_capture_endpoint() {
        let client = screenshot_client(Canned::new(200, b"{}"));
        let req = client
            .build_capture(&Target::html("<p>x</p>"), &ScreenshotOptions::default(), OutputMode::Raw)
            .unwrap();
        assert_eq!(req.path, "https://restpack.io/api/screenshot/v3/capture");
    }

    #[test]
    fn base_path_override() {
        let config = ClientConfig::new("tok").with_base_path("http://127.0.0.1:9999/api/screenshot/v3/");
        let client: ScreenshotClient<Canned> = CaptureClient::with_transport(Canned::new(200, b"{}"), &config);
        let req = client
            .build_capture(&Target::url("https://a.b"), &ScreenshotOptions::default(), OutputMode::Json)
            .unwrap();
        assert_eq!(req.path, "http://127.0.0.1:9999/api/screenshot/v3/capture");
    }

    #[test]
    fn capture_url_decodes_result() {
        let client = pdf_client(Canned::new(
            200,
            br#"{"image":"https://cdn.restpack.io/a/cache/x.pdf","width":"1280","height":"1024","remote_status":"200","cached":"false","url":"https://example.com"}"#,
        ));
        let opts = HtmlToPdfOptions {
            pdf_page: Some("A4".to_string()),
            ..Default::default()
        };
        let res = client.capture_url("https://example.com", &opts).unwrap();
        assert_eq!(res.image, "https://cdn.restpack.io/a/cache/x.pdf");
        assert!(!res.cached);
        assert_eq!(res.url.as_deref(), Some("https://example.com"));

        let sent = client.base().transport().last_body();
        assert_eq!(sent["pdf_page"], "A4");
        assert_eq!(sent["json"], true);
        assert_eq!(sent["url"], "https://example.com");
        assert!(sent.get("html").is_none());
    }

    #[test]
    fn capture_html_sends_markup_only() {
        let client = screenshot_client(Canned::new(200, br#"{"image":"https://cdn/x.png","cached":true}"#));
        let res = client.capture_html("<h1>Test</h1>", &ScreenshotOptions::default()).unwrap();
        assert!(res.cached);
        assert!(res.url.is_none());

        let sent = client.base().transport().last_body();
        assert_eq!(sent["html"], "<h1>Test</h1>");
        assert!(sent.get("url").is_none());
    }

    #[test]
    fn invalid_token_message_is_surfaced() {
        let body = serde_json::json!({ "error": INVALID_TOKEN }).to_string();
        let client = pdf_client(Canned::new(401, body.as_bytes()));
        let err = client.capture_url("https://google.com/", &HtmlToPdfOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), INVALID_TOKEN);
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn error_status_wins_over_decodable_body() {
        // A body that would decode as a result is still an error at >= 300.
        let client = pdf_client(Canned::new(300, br#"{"image":"https://cdn/x.pdf"}"#));
        let err = client.capture_url("https://example.com", &HtmlToPdfOptions::default()).unwrap_err();
        assert!(matches!(err, ApiError::Service { status: 300, .. }));
    }

    #[test]
    fn raw_error_uses_body_text() {
        let client = pdf_client(Canned::new(400, b"net::ERR_NAME_NOT_RESOLVED at https://google/"));
        let err = client.capture_url_to_stream("https://google/", &HtmlToPdfOptions::default()).unwrap_err();
        assert!(err.to_string().contains("net::ERR_NAME_NOT_RESOLVED"));
    }

    #[test]
    fn empty_error_body_falls_back_to_status_line() {
        let client = pdf_client(Canned::new(400, b""));
        let err = client.capture_html_to_stream("<p/>", &HtmlToPdfOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "400 Bad Request");
    }

    #[test]
    fn bad_json_is_deserialization_error() {
        let client = pdf_client(Canned::new(200, b"<html>oops</html>"));
        let err = client.capture_url("https://example.com", &HtmlToPdfOptions::default()).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn raw_stream_yields_body_bytes() {
        let client = pdf_client(Canned::new(200, b"%PDF-1.4\n%%EOF\n"));
        let mut stream = client.capture_url_to_stream("https://example.com", &HtmlToPdfOptions::default()).unwrap();
        let mut magic = [0u8; 4];
        stream.read_exact(&mut magic).unwrap();
        assert_eq!(magic, [0x25, 0x50, 0x44, 0x46]);

        let sent = client.base().transport().last_body();
        assert!(sent.get("json").is_none());
    }

    #[test]
    fn image_is_decoded() {
        let client = screenshot_client(Canned::new(200, &tiny_png()));
        let img = client.capture_url_to_image("https://example.com", &ScreenshotOptions::default()).unwrap();
        assert_eq!((img.width(), img.height()), (2, 3));
    }

    #[test]
    fn non_image_bytes_are_decode_error() {
        let client = screenshot_client(Canned::new(200, b"definitely not an image"));
        let err = client.capture_html_to_image("<h1>x</h1>", &ScreenshotOptions::default()).unwrap_err();
        assert!(matches!(err, ApiError::ImageDecode(_)));
    }

    #[test]
    fn decode_error_names_content_type() {
        let mut transport = Canned::new(200, b"<html><body>captured</body></html>");
        transport.response.headers = vec![("Content-Type".to_string(), "text/html; charset=utf-8".to_string())];
        let client = screenshot_client(transport);
        let err = client.capture_url_to_image("https://example.com", &ScreenshotOptions::default()).unwrap_err();
        assert!(matches!(err, ApiError::ImageDecode(ref m) if m.contains("content-type: text/html")));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn clients_are_send_and_sync() {
        assert_send_sync::<HtmlToPdfClient>();
        assert_send_sync::<ScreenshotClient>();
        assert_send_sync::<ScreenshotClient<Canned>>();
    }

    #[test]
    fn image_error_status_is_service_error() {
        let client = screenshot_client(Canned::new(400, br#"{"error":"Invalid url"}"#));
        let err = client.capture_url_to_image("https://google.coddm", &ScreenshotOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid url");
    }
}
