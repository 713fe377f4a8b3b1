//! Blocking client for the restpack.io HTML-to-PDF and screenshot services.
//!
//! # Overview
//! Each capture is one POST round trip. The client composes a JSON body from
//! a `Target` (URL or inline HTML) and a service option set, sends it with the
//! account's access token, and decodes the answer as either a structured
//! `CaptureResult` or the raw PDF/image bytes.
//!
//! # Design
//! - `CaptureClient<S, T>` is generic over the service (`HtmlToPdf`,
//!   `Screenshot`) and the `Transport` that performs I/O. `UreqTransport` is
//!   the default.
//! - Operations are split into `build_capture` and `parse_*` so callers with
//!   their own HTTP stack can drive the round trip themselves.
//! - Clients hold only immutable configuration and are safe to share across
//!   threads whenever the transport is.
//!
//! ```no_run
//! use restpack_core::{HtmlToPdfClient, HtmlToPdfOptions};
//!
//! let client = HtmlToPdfClient::new("my-token");
//! let result = client.capture_url("https://example.com", &HtmlToPdfOptions::default())?;
//! println!("{}", result.image);
//! # Ok::<(), restpack_core::ApiError>(())
//! ```

pub mod capture;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod options;
pub mod types;

pub use capture::{CaptureClient, CaptureService, HtmlToPdf, HtmlToPdfClient, Screenshot, ScreenshotClient};
pub use client::BaseClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use options::{CaptureMode, EmulateMedia, HtmlToPdfOptions, ImageFormat, Orientation, ScreenshotOptions, WaitUntil};
pub use types::{CaptureResult, OutputMode, Target};

pub use image::DynamicImage;
