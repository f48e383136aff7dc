//! FFmpeg audio decoding and encoding.
//!
//! Decodes any input FFmpeg understands to mono raw f64 samples at a fixed
//! rate, and encodes raw samples back into a container with metadata tags.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::backend::AudioBackend;
use super::types::{AudioData, AudioError, AudioResult, MediaTags};

/// Default sample rate for decoded narration.
///
/// Speech carries little above 11 kHz. Decoded audio is held as f64, so
/// 22.05 kHz costs about 176 KB per second of narration (roughly 320 MB for
/// a 30 minute track, with both tracks decoded at once).
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Audio backend that shells out to `ffmpeg` and `ffprobe`.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    sample_rate: u32,
    ffmpeg_path: Option<PathBuf>,
    ffprobe_path: Option<PathBuf>,
}

impl FfmpegBackend {
    /// Create a backend decoding to the given sample rate.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ffmpeg_path: None,
            ffprobe_path: None,
        }
    }

    /// Set a custom path to the ffmpeg executable.
    pub fn with_ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = Some(path.into());
        self
    }

    /// Set a custom path to the ffprobe executable.
    pub fn with_ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffprobe_path = Some(path.into());
        self
    }

    fn ffmpeg_cmd(&self) -> Command {
        match &self.ffmpeg_path {
            Some(path) => Command::new(path),
            None => Command::new("ffmpeg"),
        }
    }

    fn ffprobe_cmd(&self) -> Command {
        match &self.ffprobe_path {
            Some(path) => Command::new(path),
            None => Command::new("ffprobe"),
        }
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl AudioBackend for FfmpegBackend {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Decode to mono f64 samples.
    ///
    /// The audio is downmixed to one channel and resampled to the backend
    /// rate, then read from FFmpeg's stdout as little-endian f64.
    fn decode(&self, input_path: &Path) -> AudioResult<AudioData> {
        if !input_path.exists() {
            return Err(AudioError::SourceNotFound(
                input_path.display().to_string(),
            ));
        }

        let mut cmd = self.ffmpeg_cmd();
        cmd.arg("-nostdin")
            .arg("-i")
            .arg(input_path)
            .arg("-vn") // No video
            .arg("-ac")
            .arg("1") // Mono
            .arg("-ar")
            .arg(self.sample_rate.to_string())
            .arg("-f")
            .arg("f64le")
            .arg("-acodec")
            .arg("pcm_f64le")
            .arg("pipe:1");

        cmd.stdin(Stdio::null())
            .stderr(Stdio::piped())
            .stdout(Stdio::piped());

        tracing::debug!("Running FFmpeg: {:?}", cmd);

        let output = cmd
            .output()
            .map_err(|e| AudioError::FfmpegError(format!("Failed to spawn FFmpeg: {}", e)))?;

        if !output.status.success() {
            return Err(AudioError::FfmpegError(format!(
                "FFmpeg exited with code {:?} while decoding {}: {}",
                output.status.code(),
                input_path.display(),
                stderr_tail(&output.stderr)
            )));
        }

        let buffer = output.stdout;
        let samples = bytes_to_f64_samples(&buffer);

        if samples.is_empty() {
            return Err(AudioError::DecodeError(format!(
                "No audio samples decoded from {}",
                input_path.display()
            )));
        }

        tracing::debug!(
            "Decoded {} samples ({:.2}s) from {}",
            samples.len(),
            samples.len() as f64 / self.sample_rate as f64,
            input_path.display()
        );

        Ok(AudioData::new(samples, self.sample_rate))
    }

    /// Encode samples to `output_path`; the container/codec follows the
    /// file extension.
    fn encode(&self, audio: &AudioData, output_path: &Path, tags: &MediaTags) -> AudioResult<()> {
        if audio.is_empty() {
            return Err(AudioError::InvalidAudio(format!(
                "Refusing to encode empty audio to {}",
                output_path.display()
            )));
        }

        let mut cmd = self.ffmpeg_cmd();
        cmd.arg("-y")
            .arg("-loglevel")
            .arg("error")
            .arg("-f")
            .arg("f64le")
            .arg("-ar")
            .arg(audio.sample_rate.to_string())
            .arg("-ac")
            .arg("1")
            .arg("-i")
            .arg("pipe:0");

        for (key, value) in tags.pairs() {
            cmd.arg("-metadata").arg(format!("{}={}", key, value));
        }

        cmd.arg(output_path);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        tracing::debug!("Running FFmpeg (encode): {:?}", cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| AudioError::FfmpegError(format!("Failed to spawn FFmpeg: {}", e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AudioError::FfmpegError("Failed to open FFmpeg stdin".to_string()))?;

        let bytes = f64_samples_to_bytes(&audio.samples);

        // Feed stdin from a scoped thread so a chatty stderr cannot block us.
        let (write_result, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(&bytes));
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output =
            output.map_err(|e| AudioError::FfmpegError(format!("FFmpeg process error: {}", e)))?;

        if !output.status.success() {
            return Err(AudioError::EncodeError(format!(
                "FFmpeg exited with code {:?} writing {}: {}",
                output.status.code(),
                output_path.display(),
                stderr_tail(&output.stderr)
            )));
        }

        match write_result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(AudioError::EncodeError(format!(
                    "Failed to stream samples to FFmpeg: {}",
                    e
                )))
            }
            Err(_) => {
                return Err(AudioError::EncodeError(
                    "Sample writer thread panicked".to_string(),
                ))
            }
        }

        tracing::debug!(
            "Encoded {:.2}s of audio to {}",
            audio.duration_secs,
            output_path.display()
        );

        Ok(())
    }

    /// Get the duration of a media file using FFprobe.
    fn duration(&self, input_path: &Path) -> AudioResult<f64> {
        if !input_path.exists() {
            return Err(AudioError::SourceNotFound(
                input_path.display().to_string(),
            ));
        }

        let output = self
            .ffprobe_cmd()
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(input_path)
            .output()
            .map_err(|e| AudioError::FfmpegError(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(AudioError::FfmpegError(
                "ffprobe failed to get duration".to_string(),
            ));
        }

        let duration_str = String::from_utf8_lossy(&output.stdout);
        duration_str
            .trim()
            .parse::<f64>()
            .map_err(|e| AudioError::FfmpegError(format!("Failed to parse duration: {}", e)))
    }
}

/// Last few lines of an FFmpeg stderr capture, for error messages.
fn stderr_tail(stderr: &[u8]) -> String {
    const TAIL_LINES: usize = 5;
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(TAIL_LINES)..].join(" | ")
}

/// Convert raw bytes to f64 samples (little-endian).
fn bytes_to_f64_samples(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut arr = [0u8; 8];
            arr.copy_from_slice(chunk);
            f64::from_le_bytes(arr)
        })
        .collect()
}

/// Convert f64 samples to raw little-endian bytes.
fn f64_samples_to_bytes(samples: &[f64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 8);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let stderr = b"ffmpeg version 7\nInput #0\n\nStream #0:0\na\nb\nc\nInvalid data found\n";
        assert_eq!(stderr_tail(stderr), "Stream #0:0 | a | b | c | Invalid data found");
        assert_eq!(stderr_tail(b""), "");
    }

    #[test]
    fn bytes_to_samples_converts_correctly() {
        let val1: f64 = 0.5;
        let val2: f64 = -0.25;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&val1.to_le_bytes());
        bytes.extend_from_slice(&val2.to_le_bytes());

        let samples = bytes_to_f64_samples(&bytes);

        assert_eq!(samples.len(), 2);
        assert!((samples[0] - 0.5).abs() < 1e-10);
        assert!((samples[1] - (-0.25)).abs() < 1e-10);
    }

    #[test]
    fn bytes_to_samples_handles_partial() {
        // 10 bytes -> one sample, remainder ignored
        let bytes = vec![0u8; 10];
        let samples = bytes_to_f64_samples(&bytes);
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn samples_to_bytes_is_little_endian() {
        let bytes = f64_samples_to_bytes(&[1.0, -1.0]);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..8], &1.0f64.to_le_bytes());
        assert_eq!(bytes_to_f64_samples(&bytes), vec![1.0, -1.0]);
    }

    #[test]
    fn decode_rejects_missing_file() {
        let backend = FfmpegBackend::default();
        let result = backend.decode(Path::new("/nonexistent/narration.mp3"));
        assert!(matches!(result, Err(AudioError::SourceNotFound(_))));
    }

    #[test]
    fn duration_rejects_missing_file() {
        let backend = FfmpegBackend::default();
        let result = backend.duration(Path::new("/nonexistent/narration.mp3"));
        assert!(matches!(result, Err(AudioError::SourceNotFound(_))));
    }

    #[test]
    fn encode_rejects_empty_audio() {
        let backend = FfmpegBackend::default();
        let empty = AudioData::new(Vec::new(), DEFAULT_SAMPLE_RATE);
        let result = backend.encode(&empty, Path::new("out.mp3"), &MediaTags::default());
        assert!(matches!(result, Err(AudioError::InvalidAudio(_))));
    }
}
