//! Speech playback through the default output device via cpal.
//!
//! Each clip gets its own output stream on a detached thread. The thread
//! keeps the stream alive for the clip's duration and then drops it, so
//! `play` never blocks the caller.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use crate::error::AudioError;
use crate::{AudioSink, PcmClip};

/// Extra time the stream is kept open after the last frame.
const TAIL_MARGIN: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Default)]
pub struct CpalSink;

impl CpalSink {
    pub fn new() -> Self {
        Self
    }

    /// Whether the host reports a default output device.
    pub fn is_available(&self) -> bool {
        cpal::default_host().default_output_device().is_some()
    }
}

impl AudioSink for CpalSink {
    fn play(&self, clip: PcmClip) -> Result<(), AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Device("no default output device".to_string()))?;

        std::thread::Builder::new()
            .name("vasstos-playback".to_string())
            .spawn(move || {
                if let Err(e) = play_blocking(&device, clip) {
                    tracing::warn!(error = %e, "Playback failed");
                }
            })
            .map_err(|e| AudioError::Stream(e.to_string()))?;
        Ok(())
    }
}

fn play_blocking(device: &cpal::Device, clip: PcmClip) -> Result<(), AudioError> {
    let supported = device
        .default_output_config()
        .map_err(|e| AudioError::Device(e.to_string()))?;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    let out_rate = config.sample_rate.0;
    let wait = clip.duration() + TAIL_MARGIN;
    let samples = Arc::new(clip.samples);

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(device, &config, samples, clip.sample_rate),
        cpal::SampleFormat::I16 => build_stream::<i16>(device, &config, samples, clip.sample_rate),
        cpal::SampleFormat::U16 => build_stream::<u16>(device, &config, samples, clip.sample_rate),
        other => {
            return Err(AudioError::Device(format!(
                "unsupported output sample format: {:?}",
                other
            )))
        }
    }?;

    stream.play().map_err(|e| AudioError::Stream(e.to_string()))?;
    tracing::debug!(out_rate, wait_ms = wait.as_millis() as u64, "Output stream playing");
    std::thread::sleep(wait);
    Ok(())
}

/// Build an output stream that writes the mono clip to every device channel,
/// picking the nearest source frame when the device rate differs.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Arc<Vec<f32>>,
    src_rate: u32,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let out_rate = config.sample_rate.0 as u64;
    let position = AtomicUsize::new(0);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut frame = position.load(Ordering::Relaxed);
                for out in data.chunks_mut(channels) {
                    let src = (frame as u64 * src_rate as u64 / out_rate) as usize;
                    let value = samples.get(src).copied().unwrap_or(0.0);
                    for slot in out.iter_mut() {
                        *slot = T::from_sample(value);
                    }
                    frame += 1;
                }
                position.store(frame, Ordering::Relaxed);
            },
            |err| tracing::warn!(error = %err, "Output stream error"),
            None,
        )
        .map_err(|e| AudioError::Stream(e.to_string()))
}
