//! Microphone capture on a dedicated thread
//!
//! cpal input streams are not `Send`, so the stream lives on its own thread
//! for the duration of one listening phase. Captured f32 samples are chunked,
//! converted to little-endian PCM16 and handed to the session feed task over
//! an unbounded channel.

use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;

use voiceline_core::{pcm16_from_f32, CaptureFormat};

use crate::PipelineError;

/// Handle over a running capture thread
///
/// Capture runs until [`finish`](Self::finish) is called. Dropping the
/// handle also stops capture, but detaches the thread instead of joining it.
pub struct MicrophoneCapture {
    stop: Option<std::sync::mpsc::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl MicrophoneCapture {
    /// Open the default input device and start streaming PCM16 frames
    ///
    /// Resolves once the device stream is running, with the frame receiver.
    /// Each frame carries `chunk_ms` of audio.
    pub async fn start(
        format: CaptureFormat,
        chunk_ms: u32,
    ) -> Result<(Self, UnboundedReceiver<Vec<u8>>), PipelineError> {
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = std::sync::mpsc::channel();

        let samples_per_chunk = format.samples_per_chunk(chunk_ms);
        let thread = thread::Builder::new()
            .name("mic-capture".to_string())
            .spawn(move || capture_thread(format, samples_per_chunk, frame_tx, ready_tx, stop_rx))
            .map_err(|e| {
                PipelineError::AudioDevice(format!("failed to spawn capture thread: {e}"))
            })?;

        match ready_rx.await {
            Ok(Ok(())) => Ok((
                Self {
                    stop: Some(stop_tx),
                    thread: Some(thread),
                },
                frame_rx,
            )),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PipelineError::AudioDevice(
                "capture thread exited before the stream started".to_string(),
            )),
        }
    }

    /// Stop capture and join the thread
    ///
    /// Closes the frame channel as a side effect, which is how the session
    /// feed learns that no further audio is coming.
    pub async fn finish(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = tokio::task::spawn_blocking(move || thread.join()).await;
        }
    }
}

fn capture_thread(
    format: CaptureFormat,
    samples_per_chunk: usize,
    frame_tx: UnboundedSender<Vec<u8>>,
    ready_tx: oneshot::Sender<Result<(), PipelineError>>,
    stop_rx: std::sync::mpsc::Receiver<()>,
) {
    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(device) => device,
        None => {
            let _ = ready_tx.send(Err(PipelineError::AudioDevice(
                "no default input device".to_string(),
            )));
            return;
        }
    };

    let stream_config = cpal::StreamConfig {
        channels: format.channels,
        sample_rate: cpal::SampleRate(format.sample_rate),
        buffer_size: cpal::BufferSize::Fixed(samples_per_chunk as u32),
    };

    let mut sample_buffer: Vec<f32> = Vec::with_capacity(samples_per_chunk);
    let stream = device.build_input_stream(
        &stream_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            for &sample in data {
                sample_buffer.push(sample);
                if sample_buffer.len() >= samples_per_chunk {
                    // A closed receiver means the session is shutting down.
                    let _ = frame_tx.send(pcm16_from_f32(&sample_buffer));
                    sample_buffer.clear();
                }
            }
        },
        move |err| {
            tracing::warn!(error = %err, "input stream error");
        },
        None,
    );

    let stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(PipelineError::AudioDevice(format!(
                "failed to open input stream: {e}"
            ))));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(PipelineError::AudioDevice(format!(
            "failed to start input stream: {e}"
        ))));
        return;
    }

    let _ = ready_tx.send(Ok(()));
    tracing::debug!(
        sample_rate = format.sample_rate,
        channels = format.channels,
        samples_per_chunk,
        "microphone capture started"
    );

    // Block until the handle signals stop or is dropped.
    let _ = stop_rx.recv();
    drop(stream);
    tracing::debug!("microphone capture stopped");
}
