//! Emotion streaming service codec.
//!
//! Decodes the service's socket messages into [`EmotionSnapshot`]s and
//! builds the outbound audio frames. The socket itself is owned by the
//! caller.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::snapshot::{EmotionScores, EmotionSnapshot};

/// Capture rate the service is told to expect.
pub const AUDIO_SAMPLE_RATE: u32 = 16_000;

/// Prediction models whose scores are used. Predictions without a model tag
/// are used too.
const ACCEPTED_MODELS: [&str; 2] = ["prosody", "expressive"];

#[derive(Error, Debug)]
pub enum HumeError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),
}

/// What one inbound socket message amounts to.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// One snapshot per usable prediction, timestamps unset
    Emotions(Vec<EmotionSnapshot>),
    /// The service reported an error
    ServiceError(String),
    /// Nothing usable (acks, other models, empty predictions)
    Ignored,
}

/// Decode one raw socket message.
pub fn decode_message(raw: &str) -> Result<StreamEvent, HumeError> {
    let parsed: Value = serde_json::from_str(raw)?;
    Ok(decode_value(&parsed))
}

pub fn decode_value(message: &Value) -> StreamEvent {
    if message.get("type").and_then(Value::as_str) == Some("error") {
        let text = match message.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "Hume error".to_string(),
            Some(other) => other.to_string(),
        };
        return StreamEvent::ServiceError(text);
    }

    let Some(predictions) = message.get("predictions").and_then(Value::as_array) else {
        return StreamEvent::Ignored;
    };

    let snapshots: Vec<EmotionSnapshot> = predictions
        .iter()
        .filter_map(Value::as_object)
        .filter(|p| accepts_model(p))
        .filter_map(decode_prediction)
        .collect();

    if snapshots.is_empty() {
        StreamEvent::Ignored
    } else {
        StreamEvent::Emotions(snapshots)
    }
}

fn accepts_model(prediction: &Map<String, Value>) -> bool {
    match prediction.get("model").and_then(Value::as_str) {
        Some(model) if !model.is_empty() => ACCEPTED_MODELS.contains(&model),
        _ => true,
    }
}

fn decode_prediction(prediction: &Map<String, Value>) -> Option<EmotionSnapshot> {
    let entries = prediction.get("emotions")?.as_array()?;

    let emotions: EmotionScores = entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?;
            let score = entry.get("score")?.as_f64()?;
            Some((name.to_string(), score))
        })
        .collect();

    if emotions.is_empty() {
        return None;
    }

    Some(EmotionSnapshot {
        emotions,
        valence: prediction.get("valence").and_then(Value::as_f64),
        arousal: prediction.get("arousal").and_then(Value::as_f64),
        timestamp_ms: None,
    })
}

/// Outbound audio frame for a chunk of 16-bit little-endian PCM.
pub fn audio_input_payload(chunk: &[u8], sample_rate: u32) -> Value {
    json!({
        "type": "audio_input",
        "data": BASE64.encode(chunk),
        "encoding": "linear16",
        "sample_rate": sample_rate,
    })
}

/// Streaming URL with credentials in the query string.
pub fn stream_url(
    endpoint: &str,
    api_key: &str,
    config_id: Option<&str>,
) -> Result<String, HumeError> {
    let endpoint = endpoint.trim();
    if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
        return Err(HumeError::InvalidEndpoint(endpoint.to_string()));
    }

    let mut url = endpoint.to_string();
    let mut sep = if url.contains('?') { '&' } else { '?' };
    let mut push = |key: &str, value: &str| {
        url.push(sep);
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
        sep = '&';
    };
    push("api_key", api_key);
    if let Some(id) = config_id {
        push("config_id", id);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_predictions() {
        let raw = r#"{
            "predictions": [{
                "model": "prosody",
                "emotions": [
                    {"name": "Joy", "score": 0.71},
                    {"name": "Calmness", "score": 0.12}
                ],
                "valence": 0.4,
                "arousal": 0.6
            }]
        }"#;

        let StreamEvent::Emotions(snaps) = decode_message(raw).unwrap() else {
            panic!("expected emotions");
        };
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].emotions["Joy"], 0.71);
        assert_eq!(snaps[0].valence, Some(0.4));
        assert_eq!(snaps[0].arousal, Some(0.6));
        assert_eq!(snaps[0].timestamp_ms, None);
    }

    #[test]
    fn test_decode_skips_other_models() {
        let raw = r#"{"predictions": [
            {"model": "face", "emotions": [{"name": "Joy", "score": 1.0}]},
            {"emotions": [{"name": "Sadness", "score": 0.3}]},
            {"model": "expressive", "emotions": [{"name": "Anger", "score": 0.2}]}
        ]}"#;

        let StreamEvent::Emotions(snaps) = decode_message(raw).unwrap() else {
            panic!("expected emotions");
        };
        assert_eq!(snaps.len(), 2);
        assert!(snaps[0].emotions.contains_key("Sadness"));
        assert!(snaps[1].emotions.contains_key("Anger"));
    }

    #[test]
    fn test_decode_skips_malformed_entries() {
        let raw = r#"{"predictions": [
            {"emotions": [{"name": 3, "score": 0.5}, {"name": "Fear"}, {"name": "Panic", "score": 0.4}],
             "valence": "high"},
            {"emotions": []},
            "garbage",
            {"emotions": "nope"}
        ]}"#;

        let StreamEvent::Emotions(snaps) = decode_message(raw).unwrap() else {
            panic!("expected emotions");
        };
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].emotions.len(), 1);
        assert_eq!(snaps[0].valence, None);
    }

    #[test]
    fn test_decode_error_message() {
        assert_eq!(
            decode_message(r#"{"type": "error", "message": "quota exceeded"}"#).unwrap(),
            StreamEvent::ServiceError("quota exceeded".into())
        );
        assert_eq!(
            decode_message(r#"{"type": "error"}"#).unwrap(),
            StreamEvent::ServiceError("Hume error".into())
        );
    }

    #[test]
    fn test_decode_ignored() {
        assert_eq!(decode_message(r#"{"type": "ack"}"#).unwrap(), StreamEvent::Ignored);
        assert_eq!(decode_message(r#"{"predictions": {}}"#).unwrap(), StreamEvent::Ignored);
        assert_eq!(decode_message(r#"{"predictions": []}"#).unwrap(), StreamEvent::Ignored);
    }

    #[test]
    fn test_decode_invalid_json() {
        assert!(matches!(decode_message("{not json"), Err(HumeError::Json(_))));
    }

    #[test]
    fn test_audio_payload() {
        let payload = audio_input_payload(&[0x01, 0x02, 0x03], AUDIO_SAMPLE_RATE);
        assert_eq!(payload["type"], "audio_input");
        assert_eq!(payload["data"], "AQID");
        assert_eq!(payload["encoding"], "linear16");
        assert_eq!(payload["sample_rate"], 16_000);
    }

    #[test]
    fn test_stream_url() {
        let url = stream_url("wss://api.hume.ai/v0/stream/models", "k+y/1", Some("cfg")).unwrap();
        assert_eq!(
            url,
            "wss://api.hume.ai/v0/stream/models?api_key=k%2By%2F1&config_id=cfg"
        );

        let url = stream_url("wss://host/ws", "a b", Some("ü&=")).unwrap();
        assert_eq!(url, "wss://host/ws?api_key=a%20b&config_id=%C3%BC%26%3D");

        let url = stream_url("wss://host/ws?x=1", "abc", None).unwrap();
        assert_eq!(url, "wss://host/ws?x=1&api_key=abc");

        assert!(matches!(
            stream_url("https://host", "abc", None),
            Err(HumeError::InvalidEndpoint(_))
        ));
    }
}
