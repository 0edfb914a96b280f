//! Audio pipeline configuration
//!
//! Settings consumed by the pipeline crate: the live recognition socket
//! and the streaming synthesizer. API keys are optional here; the
//! component that needs a key raises a configuration error at first use.

use serde::{Deserialize, Serialize};

/// Live recognition (speech-to-text) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// WebSocket endpoint of the live recognition service
    #[serde(default = "default_recognition_endpoint")]
    pub endpoint: String,

    /// API key (set via VOICELINE__RECOGNITION__API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Recognition model
    #[serde(default = "default_recognition_model")]
    pub model: String,

    /// Spoken language tag
    #[serde(default = "default_language")]
    pub language: String,

    /// Ask the service to punctuate transcripts
    #[serde(default = "default_true")]
    pub punctuate: bool,

    /// Audio encoding sent over the socket
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Captured channel count
    #[serde(default = "default_channels")]
    pub channels: u16,

    /// Capture sample rate in Hz
    #[serde(default = "default_recognition_sample_rate")]
    pub sample_rate: u32,

    /// Silence window before the service declares speech final (ms)
    #[serde(default = "default_endpointing_ms")]
    pub endpointing_ms: u32,

    /// Smart formatting of numbers, dates and currency
    #[serde(default = "default_true")]
    pub smart_format: bool,

    /// Keep the socket alive between audio frames
    #[serde(default = "default_true")]
    pub keepalive: bool,

    /// Microphone frame size handed to the socket (ms)
    #[serde(default = "default_chunk_ms")]
    pub chunk_ms: u32,
}

fn default_recognition_endpoint() -> String {
    "wss://api.deepgram.com/v1/listen".to_string()
}
fn default_recognition_model() -> String {
    "nova-2".to_string()
}
fn default_language() -> String {
    "en-US".to_string()
}
fn default_encoding() -> String {
    "linear16".to_string()
}
fn default_channels() -> u16 {
    1
}
fn default_recognition_sample_rate() -> u32 {
    16_000
}
fn default_endpointing_ms() -> u32 {
    300
}
fn default_chunk_ms() -> u32 {
    30
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_recognition_endpoint(),
            api_key: None,
            model: default_recognition_model(),
            language: default_language(),
            punctuate: true,
            encoding: default_encoding(),
            channels: default_channels(),
            sample_rate: default_recognition_sample_rate(),
            endpointing_ms: default_endpointing_ms(),
            smart_format: true,
            keepalive: true,
            chunk_ms: default_chunk_ms(),
        }
    }
}

/// Streaming synthesis (text-to-speech) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// HTTP endpoint of the synthesis service
    #[serde(default = "default_synthesis_endpoint")]
    pub endpoint: String,

    /// API key (set via VOICELINE__SYNTHESIS__API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Voice model
    #[serde(default = "default_voice_model")]
    pub model: String,

    /// Latency/quality tier requested from the service
    #[serde(default = "default_performance")]
    pub performance: String,

    /// Audio encoding of the returned stream
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Playback sample rate in Hz
    #[serde(default = "default_synthesis_sample_rate")]
    pub sample_rate: u32,

    /// Playback executable, resolved on PATH before any network I/O
    #[serde(default = "default_player")]
    pub player: String,

    /// Arguments passed to the playback executable
    #[serde(default = "default_player_args")]
    pub player_args: Vec<String>,
}

fn default_synthesis_endpoint() -> String {
    "https://api.deepgram.com/v1/speak".to_string()
}
fn default_voice_model() -> String {
    "aura-stella-en".to_string()
}
fn default_performance() -> String {
    "some".to_string()
}
fn default_synthesis_sample_rate() -> u32 {
    24_000
}
fn default_player() -> String {
    "ffplay".to_string()
}
fn default_player_args() -> Vec<String> {
    vec![
        "-autoexit".to_string(),
        "-".to_string(),
        "-nodisp".to_string(),
    ]
}
fn default_true() -> bool {
    true
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_synthesis_endpoint(),
            api_key: None,
            model: default_voice_model(),
            performance: default_performance(),
            encoding: default_encoding(),
            sample_rate: default_synthesis_sample_rate(),
            player: default_player(),
            player_args: default_player_args(),
        }
    }
}
