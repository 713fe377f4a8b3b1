//! Rendering options for the two capture services.
//!
//! Every field is optional. `None` is left out of the request body so the
//! service applies its own default; `Default::default()` therefore sends no
//! options at all.

use serde::{Deserialize, Serialize};

/// Page orientation for generated documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// CSS media type to emulate while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmulateMedia {
    Screen,
    Print,
}

/// Page readiness condition to wait for before capturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    /// The window `load` event.
    Load,
    /// Network idle.
    Network,
}

/// Which part of the page a screenshot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    Fullpage,
    Viewport,
    /// Only the node matched by `element_selector`.
    Element,
}

/// Screenshot output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpg,
    /// The rendered DOM as an HTML string instead of an image.
    Html,
}

/// Options for the HTML-to-PDF service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HtmlToPdfOptions {
    /// Named page size such as `A4` or `Letter`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_page: Option<String>,
    /// CSS-style margins, e.g. `10px 20px`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_margins: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_orientation: Option<Orientation>,
    /// Custom page width. Must be paired with `pdf_height`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_height: Option<String>,
    /// HTML template repeated at the top of every page. Elements with class
    /// `pageNumber`, `totalPages`, `url`, `title` or `date` are filled in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_header: Option<String>,
    /// Footer template, same rules as `pdf_header`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_footer: Option<String>,
    /// CSS injected before rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    /// JavaScript injected before rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub js: Option<String>,
    /// Milliseconds to wait after page load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    /// Seconds the rendered document stays cached server-side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_language: Option<String>,
    /// Extra request headers for the target page, newline separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emulate_media: Option<EmulateMedia>,
    /// Render the target even when it answers outside 200-299.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_failed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<WaitUntil>,
    /// CSS selector that must appear in the DOM before capture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutter: Option<String>,
    /// Do not cache or store the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<bool>,
    /// File name for the hosted document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_ads: Option<bool>,
    /// Hide EU cookie banners before capture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_cookie_warnings: Option<bool>,
}

/// Options for the screenshot service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotOptions {
    /// Ignore any cached capture and render again.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fresh: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<CaptureMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ImageFormat>,
    /// Viewport width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Viewport height in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_width: Option<u32>,
    /// Requires `thumbnail_width`; unbounded when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub js: Option<String>,
    /// Milliseconds to wait after page load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    /// Milliseconds the image stays cached server-side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_language: Option<String>,
    /// Selector used with `CaptureMode::Element`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_selector: Option<String>,
    /// Render at 2x device pixel ratio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retina: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emulate_media: Option<EmulateMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_failed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<WaitUntil>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_serialize_to_empty_object() {
        let pdf = serde_json::to_value(HtmlToPdfOptions::default()).unwrap();
        assert_eq!(pdf, serde_json::json!({}));
        let shot = serde_json::to_value(ScreenshotOptions::default()).unwrap();
        assert_eq!(shot, serde_json::json!({}));
    }

    #[test]
    fn enums_use_wire_names() {
        let opts = HtmlToPdfOptions {
            pdf_orientation: Some(Orientation::Landscape),
            emulate_media: Some(EmulateMedia::Print),
            wait: Some(WaitUntil::Network),
            ..Default::default()
        };
        let body = serde_json::to_value(&opts).unwrap();
        assert_eq!(body["pdf_orientation"], "landscape");
        assert_eq!(body["emulate_media"], "print");
        assert_eq!(body["wait"], "network");
    }

    #[test]
    fn screenshot_fields_keep_their_types() {
        let opts = ScreenshotOptions {
            mode: Some(CaptureMode::Element),
            element_selector: Some("#hero".to_string()),
            format: Some(ImageFormat::Jpg),
            width: Some(1280),
            retina: Some(false),
            ..Default::default()
        };
        let body = serde_json::to_value(&opts).unwrap();
        assert_eq!(body["mode"], "element");
        assert_eq!(body["element_selector"], "#hero");
        assert_eq!(body["format"], "jpg");
        assert_eq!(body["width"], 1280);
        // An explicit false is still sent; only `None` is omitted.
        assert_eq!(body["retina"], false);
        assert!(body.get("height").is_none());
    }

    #[test]
    fn options_accept_partial_json() {
        let opts: ScreenshotOptions = serde_json::from_str(r#"{"width":800,"fresh":true}"#).unwrap();
        assert_eq!(opts.width, Some(800));
        assert_eq!(opts.fresh, Some(true));
        assert!(opts.height.is_none());
    }
}
