//! Core type definitions for catalog encodings and stream authorization.
//!
//! Format codes follow the catalog's own numbering so they can be passed
//! straight through from configuration and compared against fallback tables.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Error;

/// Audio encoding offered by the catalog, numbered as the catalog numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FormatCode {
    /// 16-bit / 44.1 kHz ALAC.
    Alac16 = 1,
    /// 16-bit / 44.1 kHz FLAC.
    Flac16 = 2,
    /// 24-bit / 48 kHz MQA.
    Mqa24 = 3,
    /// 360 Reality Audio. Doubles as the "best available" request.
    Immersive = 4,
    /// 150 Kbps AAC.
    Aac150 = 5,
    /// AAC delivered only through an adaptive-streaming manifest.
    AdaptiveAac = 6,
}

impl FormatCode {
    /// Catalog number for this format.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether a request for this format means "give me the best you have".
    pub fn is_best_available(self) -> bool {
        self == Self::Immersive
    }
}

impl TryFrom<u8> for FormatCode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Alac16),
            2 => Ok(Self::Flac16),
            3 => Ok(Self::Mqa24),
            4 => Ok(Self::Immersive),
            5 => Ok(Self::Aac150),
            6 => Ok(Self::AdaptiveAac),
            other => Err(Error::unsupported(format!("format code {other}"))),
        }
    }
}

impl From<FormatCode> for u8 {
    fn from(format: FormatCode) -> Self {
        format.code()
    }
}

impl fmt::Display for FormatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Alac16 => "ALAC 16-bit",
            Self::Flac16 => "FLAC 16-bit",
            Self::Mqa24 => "MQA 24-bit",
            Self::Immersive => "360 Reality Audio",
            Self::Aac150 => "AAC 150",
            Self::AdaptiveAac => "HLS AAC",
        };
        write!(f, "{name}")
    }
}

/// Requested video quality, numbered as the command line numbers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VideoFormat {
    P480 = 1,
    P720 = 2,
    P1080 = 3,
    P1440 = 4,
    /// 4K, or whatever the top variant is.
    Best = 5,
}

impl VideoFormat {
    /// Target frame height for this request.
    pub fn height(self) -> u32 {
        match self {
            Self::P480 => 480,
            Self::P720 => 720,
            Self::P1080 => 1080,
            Self::P1440 => 1440,
            Self::Best => 2160,
        }
    }
}

impl TryFrom<u8> for VideoFormat {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::P480),
            2 => Ok(Self::P720),
            3 => Ok(Self::P1080),
            4 => Ok(Self::P1440),
            5 => Ok(Self::Best),
            other => Err(Error::unsupported(format!("video format {other}"))),
        }
    }
}

impl From<VideoFormat> for u8 {
    fn from(format: VideoFormat) -> Self {
        format as u8
    }
}

/// One concrete encoding the catalog will serve for a track right now.
///
/// Built by URL classification and never mutated; resolving an adaptive
/// manifest produces a new candidate through [`EncodingCandidate::with_variant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingCandidate {
    specs: String,
    extension: String,
    url: String,
    format: FormatCode,
}

impl EncodingCandidate {
    pub fn new(
        specs: impl Into<String>,
        extension: impl Into<String>,
        url: impl Into<String>,
        format: FormatCode,
    ) -> Self {
        Self {
            specs: specs.into(),
            extension: extension.into(),
            url: url.into(),
            format,
        }
    }

    /// Human-readable description, e.g. `16-bit / 44.1 kHz FLAC`.
    pub fn specs(&self) -> &str {
        &self.specs
    }

    /// Output file extension including the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn format(&self) -> FormatCode {
        self.format
    }

    /// Whether the source URL is an adaptive-streaming manifest.
    pub fn is_adaptive(&self) -> bool {
        self.format == FormatCode::AdaptiveAac
    }

    /// Candidate pointing at a concrete variant playlist with refreshed specs.
    pub fn with_variant(&self, specs: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            specs: specs.into(),
            extension: self.extension.clone(),
            url: url.into(),
            format: self.format,
        }
    }
}

/// Authorization context threaded through every stream request.
///
/// Owned by the caller; the pipeline only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamParams {
    pub subscription_id: String,
    pub plan_access_id: String,
    pub user_id: String,
    /// Subscription window start, Unix seconds.
    pub window_start: i64,
    /// Subscription window end, Unix seconds.
    pub window_end: i64,
}

impl StreamParams {
    /// Query pairs sent with every stream-metadata request.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("subscriptionID", self.subscription_id.clone()),
            ("subCostplanIDAccessList", self.plan_access_id.clone()),
            ("nn_userID", self.user_id.clone()),
            ("startDateStamp", self.window_start.to_string()),
            ("endDateStamp", self.window_end.to_string()),
        ]
    }
}
