use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthError {
    /// Any non-success response, transport failure, or timeout from the
    /// remote service. Callers treat all of these uniformly.
    #[error("remote synthesis failed: {0}")]
    Remote(String),
    #[error("local synthesis failed: {0}")]
    Local(String),
}

/// Remote speech-synthesis service: submit text, receive a reference to the
/// synthesized audio, fetch the audio by that reference.
pub trait RemoteSynth: Send + Sync {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthError>;
}

/// On-device fallback synthesizer.
pub trait LocalSynth: Send {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthError>;
}

#[cfg(feature = "network")]
mod http {
    use std::time::Duration;

    use serde::Deserialize;

    use super::{RemoteSynth, SynthError};

    #[derive(Deserialize)]
    struct SynthReference {
        audio_url: String,
    }

    pub struct HttpSynth {
        endpoint: String,
        client: reqwest::blocking::Client,
    }

    impl HttpSynth {
        pub fn new(endpoint: &str) -> Option<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .ok()?;
            Some(Self {
                endpoint: endpoint.trim_end_matches('/').to_string(),
                client,
            })
        }
    }

    impl RemoteSynth for HttpSynth {
        fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthError> {
            let remote = |e: &dyn std::fmt::Display| SynthError::Remote(e.to_string());

            let response = self
                .client
                .post(format!("{}/synthesize", self.endpoint))
                .json(&serde_json::json!({ "text": text }))
                .send()
                .map_err(|e| remote(&e))?;
            if !response.status().is_success() {
                return Err(SynthError::Remote(format!(
                    "submit returned {}",
                    response.status()
                )));
            }
            let reference: SynthReference = response.json().map_err(|e| remote(&e))?;

            let audio = self
                .client
                .get(&reference.audio_url)
                .send()
                .map_err(|e| remote(&e))?;
            if !audio.status().is_success() {
                return Err(SynthError::Remote(format!(
                    "fetch returned {}",
                    audio.status()
                )));
            }
            let bytes = audio.bytes().map_err(|e| remote(&e))?;
            Ok(bytes.to_vec())
        }
    }
}

#[cfg(feature = "network")]
pub fn http_synth(endpoint: &str) -> Option<Arc<dyn RemoteSynth>> {
    http::HttpSynth::new(endpoint).map(|s| Arc::new(s) as Arc<dyn RemoteSynth>)
}

#[cfg(not(feature = "network"))]
pub fn http_synth(_endpoint: &str) -> Option<Arc<dyn RemoteSynth>> {
    None
}

/// Deterministic PCM tone derived from the text. Real speech synthesis is an
/// external concern; this fallback guarantees the user hears *something*
/// distinct per phrase when remote synthesis is unreachable.
pub struct TonePrompt {
    sample_rate: u32,
}

impl TonePrompt {
    pub fn new() -> Self {
        Self { sample_rate: 16_000 }
    }
}

impl Default for TonePrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSynth for TonePrompt {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthError> {
        if text.is_empty() {
            return Err(SynthError::Local("empty text".to_string()));
        }
        let chars = text.chars().count() as u32;
        // 60ms per character, clamped so long phrases stay bearable.
        let millis = (chars * 60).clamp(200, 2_000);
        let samples = self.sample_rate * millis / 1000;
        // Pitch keyed off the text so adjacent phrases sound different.
        let mut key: u32 = 0;
        for ch in text.chars() {
            key = key.wrapping_mul(31).wrapping_add(ch as u32);
        }
        let freq = 320.0 + (key % 480) as f32;

        let mut bytes = Vec::with_capacity(samples as usize * 2);
        for n in 0..samples {
            let t = n as f32 / self.sample_rate as f32;
            let sample = (t * freq * 2.0 * std::f32::consts::PI).sin();
            let value = (sample * i16::MAX as f32 * 0.4) as i16;
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        Ok(bytes)
    }
}
