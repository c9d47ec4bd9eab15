//! Video generation types.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Output resolution accepted by `/process-video`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "480p")]
    Sd480,
    #[default]
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Hd1080,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Sd480 => "480p",
            Resolution::Hd720 => "720p",
            Resolution::Hd1080 => "1080p",
        }
    }

    /// Get the next resolution (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Resolution::Sd480 => Resolution::Hd720,
            Resolution::Hd720 => Resolution::Hd1080,
            Resolution::Hd1080 => Resolution::Sd480,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a render is paid for. Purely a UI mode on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    #[default]
    Balance,
    AdSupported,
}

impl PaymentMode {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMode::Balance => "Pay from balance",
            PaymentMode::AdSupported => "Ad-supported",
        }
    }

    pub fn from_checked(checked: bool) -> Self {
        if checked {
            PaymentMode::AdSupported
        } else {
            PaymentMode::Balance
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, PaymentMode::AdSupported)
    }
}

/// Everything the editor submits to `/process-video`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessVideoRequest {
    pub audio_file: Option<PathBuf>,
    pub video_files: Vec<PathBuf>,
    pub text_prompt: Option<String>,
    pub resolution: Resolution,
}

/// Response from `/process-video`
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProcessVideoResponse {
    pub video_url: String,
    /// Hours until the server deletes the output. Sent as a string or a number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub expires_in: Option<String>,
}

impl ProcessVideoResponse {
    pub fn summary(&self) -> String {
        match self.expires_in {
            Some(ref hours) => format!("Video ready: {} (expires in {}h)", self.video_url, hours),
            None => format!("Video ready: {}", self.video_url),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_cycle() {
        assert_eq!(Resolution::default(), Resolution::Hd720);
        assert_eq!(Resolution::Sd480.next(), Resolution::Hd720);
        assert_eq!(Resolution::Hd720.next(), Resolution::Hd1080);
        assert_eq!(Resolution::Hd1080.next(), Resolution::Sd480);
        assert_eq!(Resolution::Hd1080.to_string(), "1080p");
    }

    #[test]
    fn test_payment_mode_from_checked() {
        assert_eq!(PaymentMode::from_checked(true), PaymentMode::AdSupported);
        assert_eq!(PaymentMode::from_checked(false), PaymentMode::Balance);
        assert!(PaymentMode::AdSupported.is_checked());
    }

    #[test]
    fn test_process_video_response_expiry_forms() {
        let text: ProcessVideoResponse =
            serde_json::from_str(r#"{"video_url": "output/1.mp4", "expires_in": "24"}"#).unwrap();
        assert_eq!(text.expires_in.as_deref(), Some("24"));

        let number: ProcessVideoResponse =
            serde_json::from_str(r#"{"video_url": "output/1.mp4", "expires_in": 48}"#).unwrap();
        assert_eq!(number.expires_in.as_deref(), Some("48"));

        let missing: ProcessVideoResponse =
            serde_json::from_str(r#"{"video_url": "output/1.mp4", "expires_in": null}"#).unwrap();
        assert_eq!(missing.expires_in, None);
        assert_eq!(missing.summary(), "Video ready: output/1.mp4");
    }
}
