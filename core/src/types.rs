//! Wire DTOs shared by both capture services.
//!
//! # Design
//! `Target` is a sum type so a payload can never carry both `url` and `html`,
//! or neither. `CallPayload` flattens the service's option struct next to the
//! target and the `json` flag, matching the service's single-object body.
//!
//! The two service versions disagree on scalar encodings in the structured
//! result (`cached` may be `true` or `"true"`, dimensions may be numbers or
//! strings), so `CaptureResult` decodes both forms.

use serde::{Deserialize, Deserializer, Serialize};

/// What the service should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// A publicly reachable page.
    Url(String),
    /// Inline markup rendered as-is.
    Html(String),
}

impl Target {
    pub fn url(url: impl Into<String>) -> Self {
        Target::Url(url.into())
    }

    pub fn html(markup: impl Into<String>) -> Self {
        Target::Html(markup.into())
    }
}

/// Whether the service answers with a JSON record or the artifact bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Json,
    Raw,
}

/// Request body sent to `/convert` and `/capture`.
#[derive(Debug, Serialize)]
pub struct CallPayload<'a, O> {
    #[serde(flatten)]
    pub options: &'a O,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub json: bool,
    #[serde(flatten)]
    pub target: &'a Target,
}

/// Structured result of a JSON-mode capture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaptureResult {
    /// Hosted URL of the rendered artifact.
    #[serde(default)]
    pub image: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub width: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub height: Option<String>,
    /// Status the target page answered with.
    #[serde(default, deserialize_with = "lenient::string")]
    pub remote_status: Option<String>,
    /// Whether the service served a cached render.
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub cached: bool,
    /// The captured URL; absent for inline markup.
    #[serde(default)]
    pub url: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Bool(bool),
        Int(i64),
        Float(f64),
        Str(String),
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Scalar>::deserialize(d)? {
            None => None,
            Some(Scalar::Str(s)) if s.is_empty() => None,
            Some(Scalar::Str(s)) => Some(s),
            Some(Scalar::Int(n)) => Some(n.to_string()),
            Some(Scalar::Float(n)) => Some(n.to_string()),
            Some(Scalar::Bool(b)) => Some(b.to_string()),
        })
    }

    pub fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match Option::<Scalar>::deserialize(d)? {
            None => Ok(false),
            Some(Scalar::Bool(b)) => Ok(b),
            Some(Scalar::Int(n)) => Ok(n != 0),
            Some(Scalar::Str(s)) => match s.as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" | "" => Ok(false),
                other => Err(serde::de::Error::custom(format!("invalid boolean string: {other}"))),
            },
            Some(Scalar::Float(_)) => Err(serde::de::Error::custom("invalid boolean: float")),
        }
    }
}
