//! Audio capture format and PCM16 conversion

/// Scale factor for f32 -> i16 PCM conversion
pub const PCM16_SCALE: f32 = 32767.0;

/// Normalization factor for i16 -> f32 PCM conversion
pub const PCM16_NORMALIZE: f32 = 32768.0;

/// Capture format fed to the recognition session
///
/// The recognition service is configured for linear PCM, so the capture side
/// must match this format exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    /// Samples per second
    pub sample_rate: u32,
    /// Channel count (the session is opened mono)
    pub channels: u16,
}

impl Default for CaptureFormat {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
        }
    }
}

impl CaptureFormat {
    /// Samples in a chunk of the given duration
    pub fn samples_per_chunk(&self, chunk_ms: u32) -> usize {
        (self.sample_rate as usize * self.channels as usize * chunk_ms as usize) / 1000
    }
}

/// Convert normalized f32 samples to little-endian PCM16 bytes
pub fn pcm16_from_f32(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&sample| {
            let clamped = sample.clamp(-1.0, 1.0);
            let pcm16 = (clamped * PCM16_SCALE) as i16;
            pcm16.to_le_bytes()
        })
        .collect()
}

/// Convert little-endian PCM16 bytes to normalized f32 samples
pub fn f32_from_pcm16(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|chunk| {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            sample as f32 / PCM16_NORMALIZE
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_matches_session_config() {
        let format = CaptureFormat::default();
        assert_eq!(format.sample_rate, 16_000);
        assert_eq!(format.channels, 1);
        assert_eq!(format.samples_per_chunk(30), 480);
    }

    #[test]
    fn test_pcm16_round_trip() {
        let samples = vec![0.0_f32, 0.5, -0.5, 1.0, -1.0];
        let bytes = pcm16_from_f32(&samples);
        assert_eq!(bytes.len(), samples.len() * 2);

        let restored = f32_from_pcm16(&bytes);
        for (orig, round) in samples.iter().zip(restored.iter()) {
            assert!((orig - round).abs() < 0.001, "{orig} vs {round}");
        }
    }

    #[test]
    fn test_pcm16_clamps_out_of_range() {
        let bytes = pcm16_from_f32(&[2.0, -2.0]);
        let restored = f32_from_pcm16(&bytes);
        assert!(restored[0] > 0.99);
        assert!(restored[1] < -0.99);
    }
}
