//! In-process stand-in for the restpack.io capture services.
//!
//! Serves `POST /api/html2pdf/v5/convert` and `POST /api/screenshot/v3/capture`
//! with the same contract as the hosted API: `x-access-token` authentication,
//! `{"error": ...}` bodies on failure, and either a JSON record or the
//! artifact bytes depending on the `json` flag. Rendering is faked: PDFs are a
//! fixed minimal document and screenshots are a flat image of the requested
//! size.
//!
//! Hostnames without a dot (other than `localhost`) and anything under the
//! reserved `.invalid` TLD fail the way an unresolvable target does upstream.

use std::{collections::HashMap, io::Cursor, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use url::{Host, Url};
use uuid::Uuid;

pub const VALID_TOKEN: &str = "mock-token";

pub const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or you are not subscribed to any plan. Please visit the API console and choose your subscription plan.";

pub const PDF_PATH: &str = "/api/html2pdf/v5/convert";
pub const SCREENSHOT_PATH: &str = "/api/screenshot/v3/capture";

const DEFAULT_WIDTH: u32 = 400;
const DEFAULT_HEIGHT: u32 = 300;
/// Largest accepted image side in pixels.
const MAX_SIDE: u32 = 10_000;

/// The subset of the call body the mock acts on. Other option fields are
/// accepted and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CallPayload {
    #[serde(default)]
    pub json: bool,
    pub url: Option<String>,
    pub html: Option<String>,
    pub fresh: Option<bool>,
    pub format: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub thumbnail_width: Option<u32>,
    pub thumbnail_height: Option<u32>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Service {
    Pdf,
    Screenshot,
}

/// Hosted artifact URLs by (service, target), so repeat captures report
/// `cached`.
type Renders = Arc<RwLock<HashMap<(Service, String), String>>>;

#[derive(Clone)]
struct AppState {
    access_token: Arc<str>,
    renders: Renders,
}

pub fn app() -> Router {
    app_with_token(VALID_TOKEN)
}

pub fn app_with_token(access_token: &str) -> Router {
    let state = AppState {
        access_token: Arc::from(access_token),
        renders: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route(PDF_PATH, post(convert))
        .route(SCREENSHOT_PATH, post(capture))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn convert(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    handle(&state, Service::Pdf, &headers, &body).await
}

async fn capture(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    handle(&state, Service::Screenshot, &headers, &body).await
}

async fn handle(state: &AppState, service: Service, headers: &HeaderMap, body: &[u8]) -> Response {
    let token = headers.get("x-access-token").and_then(|v| v.to_str().ok());
    if token != Some(&*state.access_token) {
        tracing::debug!(?service, "rejected access token");
        return error(StatusCode::UNAUTHORIZED, INVALID_TOKEN_MESSAGE);
    }

    let payload: CallPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => return error(StatusCode::BAD_REQUEST, &format!("Invalid request body: {e}")),
    };

    let target = match (&payload.url, &payload.html) {
        (Some(url), None) => {
            if let Err(message) = check_resolvable(url) {
                return error(StatusCode::BAD_REQUEST, &message);
            }
            url.clone()
        }
        (None, Some(html)) => html.clone(),
        (Some(_), Some(_)) => return error(StatusCode::BAD_REQUEST, "Provide either url or html, not both"),
        (None, None) => return error(StatusCode::BAD_REQUEST, "Either url or html parameter is required"),
    };

    let format = match service {
        Service::Pdf => "pdf",
        Service::Screenshot => match payload.format.as_deref().unwrap_or("png") {
            "png" => "png",
            "jpg" | "jpeg" => "jpg",
            "html" => "html",
            other => return error(StatusCode::BAD_REQUEST, &format!("Invalid format: {other}")),
        },
    };
    let (width, height) = match dimensions(&payload) {
        Ok(dims) => dims,
        Err(message) => return error(StatusCode::BAD_REQUEST, message),
    };

    if !payload.json {
        tracing::debug!(?service, format, "serving raw artifact");
        return match render(format, width, height, &target) {
            Ok((content_type, bytes)) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
            Err(message) => error(StatusCode::INTERNAL_SERVER_ERROR, &message),
        };
    }

    let fresh = payload.fresh.unwrap_or(false);
    let (image, cached) = {
        let mut renders = state.renders.write().await;
        let key = (service, target.clone());
        match renders.get(&key) {
            Some(image) if !fresh => (image.clone(), true),
            _ => {
                let name = payload.filename.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                let image = format!("https://cdn.restpack.io/a/cache/{name}.{format}");
                renders.insert(key, image.clone());
                (image, false)
            }
        }
    };

    // The PDF service encodes scalars as strings; the screenshot service uses
    // native JSON types.
    let mut record = match service {
        Service::Pdf => json!({
            "image": image,
            "width": width.to_string(),
            "height": height.to_string(),
            "cached": cached.to_string(),
        }),
        Service::Screenshot => json!({
            "image": image,
            "width": width,
            "height": height,
            "cached": cached,
        }),
    };
    if let Some(url) = &payload.url {
        record["url"] = json!(url);
        record["remote_status"] = match service {
            Service::Pdf => json!("200"),
            Service::Screenshot => json!(200),
        };
    }
    Json(record).into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn check_resolvable(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|_| "Invalid url".to_string())?;
    let resolvable = match url.host() {
        Some(Host::Domain(domain)) => {
            domain == "localhost" || (domain.contains('.') && !domain.ends_with(".invalid"))
        }
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => return Err("Invalid url".to_string()),
    };
    if resolvable {
        Ok(())
    } else {
        Err(format!("net::ERR_NAME_NOT_RESOLVED at {raw}"))
    }
}

fn dimensions(payload: &CallPayload) -> Result<(u32, u32), &'static str> {
    let width = payload.thumbnail_width.or(payload.width).unwrap_or(DEFAULT_WIDTH).max(1);
    if width > MAX_SIDE {
        return Err("Invalid width");
    }
    let height = match (payload.thumbnail_width, payload.thumbnail_height) {
        (Some(_), Some(h)) => h,
        (Some(_), None) => (u64::from(width) * u64::from(DEFAULT_HEIGHT) / u64::from(DEFAULT_WIDTH)) as u32,
        (None, _) => payload.height.unwrap_or(DEFAULT_HEIGHT),
    }
    .max(1);
    if height > MAX_SIDE {
        return Err("Invalid height");
    }
    Ok((width, height))
}

fn render(format: &str, width: u32, height: u32, target: &str) -> Result<(&'static str, Vec<u8>), String> {
    match format {
        "pdf" => Ok(("application/pdf", pdf_document(target))),
        "html" => Ok(("text/html; charset=utf-8", format!("<html><body>{target}</body></html>").into_bytes())),
        "png" => encode_image(width, height, image::ImageFormat::Png).map(|b| ("image/png", b)),
        _ => encode_image(width, height, image::ImageFormat::Jpeg).map(|b| ("image/jpeg", b)),
    }
}

fn pdf_document(title: &str) -> Vec<u8> {
    let title: String = title.chars().filter(|c| c.is_ascii_alphanumeric() || *c == ' ').take(64).collect();
    format!(
        "%PDF-1.4\n\
         1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
         2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n\
         3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] >> endobj\n\
         4 0 obj << /Title ({title}) >> endobj\n\
         trailer << /Root 1 0 R /Info 4 0 R >>\n\
         %%EOF\n"
    )
    .into_bytes()
}

fn encode_image(width: u32, height: u32, format: image::ImageFormat) -> Result<Vec<u8>, String> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([240, 240, 240]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, format)
        .map_err(|e| e.to_string())?;
    Ok(out.into_inner())
}
