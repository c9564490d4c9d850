//! Remote vision classifier.
//!
//! A still frame is downscaled to 256×256, JPEG-encoded, base64'd and sent
//! to a Gemini-style `generateContent` endpoint that answers with
//! `{"gesture": "OPEN"|"CLOSED"|"NONE", "x": .., "y": ..}`.
//!
//! Response parsing is always compiled so it can be exercised without the
//! network stack; the HTTP client and image pipeline need feature `remote`.
//!
//! Nothing in here surfaces an error to the scene: [`RemoteClassifier`]
//! logs the failure and reports [`Observation::neutral`].

use formation_core::Observation;
use tracing::debug;

/// Edge length of the square frame sent for classification.
pub const FRAME_SIZE: u32 = 256;
pub const JPEG_QUALITY: u8 = 60;

pub const SYSTEM_INSTRUCTION: &str = "\
You are a computer vision engine. Look for a human hand in the image.
1. Decide whether a hand is clearly visible.
2. Classify it as \"OPEN\" (fingers spread, palm showing) or \"CLOSED\" (fist, pinch, fingers together).
3. Estimate the centre of the hand as x, y in [0, 1], with 0,0 at the top-left and 1,1 at the bottom-right.
If no hand is clearly visible, answer with gesture \"NONE\".
Reply with raw JSON only, no markdown.";

pub const USER_PROMPT: &str = "Analyze hand gesture and position.";

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Request could not be sent or the connection failed.
    #[error("classifier request failed: {0}")]
    Http(String),

    #[error("classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Frame could not be read or encoded.
    #[error("frame capture failed: {0}")]
    Frame(String),

    #[error("classifier response is not a valid observation: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("classifier is missing an API key")]
    MissingKey,
}

// ════════════════════════════════════════════════════════════════════════════
// Response parsing
// ════════════════════════════════════════════════════════════════════════════

/// Parse the model's text answer.  Tolerates ```json fences; an empty
/// answer means "no hand".
pub fn parse_observation(raw: &str) -> Result<Observation, ClassifierError> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        debug!("empty classifier answer, treating as no hand");
        return Ok(Observation::neutral());
    }
    Ok(serde_json::from_str(cleaned)?)
}

/// `candidates[0].content.parts[0].text` from a `generateContent` reply.
pub fn candidate_text(reply: &serde_json::Value) -> Option<&str> {
    reply.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(serde_json::Value::as_str)
}

/// Request body for one classification.
pub fn request_body(jpeg_base64: &str) -> serde_json::Value {
    serde_json::json!({
        "systemInstruction": { "parts": [ { "text": SYSTEM_INSTRUCTION } ] },
        "contents": [ {
            "parts": [
                { "inlineData": { "mimeType": "image/jpeg", "data": jpeg_base64 } },
                { "text": USER_PROMPT }
            ]
        } ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "gesture": { "type": "STRING", "enum": ["OPEN", "CLOSED", "NONE"] },
                    "x": { "type": "NUMBER" },
                    "y": { "type": "NUMBER" }
                },
                "required": ["gesture", "x", "y"]
            }
        }
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Frames + HTTP (feature = "remote")
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "remote")]
pub use remote::{encode_frame, FrameSource, RemoteClassifier, StillFrameSource};

#[cfg(feature = "remote")]
mod remote {
    use std::path::PathBuf;
    use std::time::Duration;

    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use image::codecs::jpeg::JpegEncoder;
    use image::imageops::FilterType;
    use image::DynamicImage;
    use formation_core::Observation;
    use tracing::{debug, warn};

    use super::{candidate_text, parse_observation, request_body, ClassifierError, FRAME_SIZE, JPEG_QUALITY};
    use crate::config::RemoteConfig;
    use crate::gesture::GestureClassifier;

    /// Supplies the frame to classify on each poll.
    pub trait FrameSource: Send + 'static {
        fn capture(&mut self) -> Result<DynamicImage, ClassifierError>;
    }

    /// Re-reads an image file on every poll; an external grabber keeps it
    /// current.
    pub struct StillFrameSource {
        path: PathBuf,
    }

    impl StillFrameSource {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            StillFrameSource { path: path.into() }
        }
    }

    impl FrameSource for StillFrameSource {
        fn capture(&mut self) -> Result<DynamicImage, ClassifierError> {
            image::open(&self.path)
                .map_err(|e| ClassifierError::Frame(format!("{}: {e}", self.path.display())))
        }
    }

    /// Downscale to 256×256 and return base64 JPEG.
    pub fn encode_frame(frame: &DynamicImage) -> Result<String, ClassifierError> {
        let small = frame.resize_exact(FRAME_SIZE, FRAME_SIZE, FilterType::Triangle).to_rgb8();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
            .encode_image(&small)
            .map_err(|e| ClassifierError::Frame(e.to_string()))?;
        Ok(STANDARD.encode(&jpeg))
    }

    pub struct RemoteClassifier<F: FrameSource> {
        client:   reqwest::blocking::Client,
        endpoint: String,
        model:    String,
        api_key:  String,
        frames:   F,
    }

    impl<F: FrameSource> RemoteClassifier<F> {
        pub fn new(cfg: &RemoteConfig, frames: F) -> Result<Self, ClassifierError> {
            let api_key = cfg.api_key.clone().ok_or(ClassifierError::MissingKey)?;
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_millis(cfg.timeout_ms))
                .build()
                .map_err(|e| ClassifierError::Http(e.to_string()))?;
            Ok(RemoteClassifier {
                client,
                endpoint: cfg.endpoint.trim_end_matches('/').to_owned(),
                model:    cfg.model.clone(),
                api_key,
                frames,
            })
        }

        fn request(&mut self) -> Result<Observation, ClassifierError> {
            let frame = self.frames.capture()?;
            let body = request_body(&encode_frame(&frame)?);
            let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);

            let response = self.client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .map_err(|e| ClassifierError::Http(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text()
                    .unwrap_or_else(|_| "unable to read error body".to_owned());
                return Err(ClassifierError::Status { status: status.as_u16(), body });
            }

            let reply: serde_json::Value = response.json()
                .map_err(|e| ClassifierError::Http(e.to_string()))?;
            match candidate_text(&reply) {
                Some(text) => parse_observation(text),
                None => {
                    debug!("classifier reply has no candidate text");
                    Ok(Observation::neutral())
                }
            }
        }
    }

    impl<F: FrameSource> GestureClassifier for RemoteClassifier<F> {
        fn classify(&mut self) -> Observation {
            match self.request() {
                Ok(obs) => obs,
                Err(e) => {
                    warn!(error = %e, "vision classifier failed, using neutral observation");
                    Observation::neutral()
                }
            }
        }

        fn name(&self) -> &'static str { "remote" }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use base64::Engine as _;
        use image::RgbImage;

        #[test]
        fn frames_are_downscaled_jpeg() {
            let big = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, image::Rgb([200, 30, 30])));
            let b64 = encode_frame(&big).unwrap();
            let bytes = STANDARD.decode(b64).unwrap();
            assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
            let back = image::load_from_memory(&bytes).unwrap();
            assert_eq!((back.width(), back.height()), (FRAME_SIZE, FRAME_SIZE));
        }

        #[test]
        fn missing_frame_is_a_frame_error() {
            let mut src = StillFrameSource::new("/nonexistent/frame.jpg");
            assert!(matches!(src.capture(), Err(ClassifierError::Frame(_))));
        }

        #[test]
        fn unreachable_endpoint_yields_neutral() {
            struct Solid;
            impl FrameSource for Solid {
                fn capture(&mut self) -> Result<DynamicImage, ClassifierError> {
                    Ok(DynamicImage::ImageRgb8(RgbImage::new(32, 32)))
                }
            }
            let cfg = RemoteConfig {
                endpoint:   "http://127.0.0.1:9".to_owned(),
                api_key:    Some("test".to_owned()),
                timeout_ms: 200,
                ..RemoteConfig::default()
            };
            let mut c = RemoteClassifier::new(&cfg, Solid).unwrap();
            assert_eq!(c.classify(), Observation::neutral());
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use formation_core::Gesture;

    #[test]
    fn parses_clean_json() {
        let obs = parse_observation(r#"{"gesture":"OPEN","x":0.3,"y":0.6}"#).unwrap();
        assert_eq!(obs, Observation::new(Gesture::Open, 0.3, 0.6));
    }

    #[test]
    fn strips_markdown_fences() {
        let raw = "```json\n{\"gesture\": \"CLOSED\", \"x\": 0.5, \"y\": 0.25}\n```";
        let obs = parse_observation(raw).unwrap();
        assert_eq!(obs.gesture, Gesture::Closed);
        assert_eq!(obs.y, 0.25);
    }

    #[test]
    fn empty_answer_is_no_hand() {
        assert_eq!(parse_observation("  \n").unwrap(), Observation::neutral());
        assert_eq!(parse_observation("``````").unwrap(), Observation::neutral());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(parse_observation("a fist, probably"), Err(ClassifierError::Decode(_))));
        assert!(matches!(parse_observation(r#"{"gesture":"WAVE","x":0,"y":0}"#), Err(ClassifierError::Decode(_))));
        assert!(matches!(parse_observation(r#"{"gesture":"OPEN"}"#), Err(ClassifierError::Decode(_))));
    }

    #[test]
    fn extracts_candidate_text() {
        let reply = serde_json::json!({
            "candidates": [ { "content": { "parts": [ { "text": "{\"gesture\":\"NONE\",\"x\":0.5,\"y\":0.5}" } ] } } ]
        });
        let text = candidate_text(&reply).unwrap();
        assert_eq!(parse_observation(text).unwrap(), Observation::neutral());
        assert!(candidate_text(&serde_json::json!({ "candidates": [] })).is_none());
    }

    #[test]
    fn request_body_carries_image_and_schema() {
        let body = request_body("QUJD");
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["data"], "QUJD");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["required"][0], "gesture");
    }
}
