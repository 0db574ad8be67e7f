//! Audio capture via cpal
//!
//! Opens one input stream and cuts the selected channel into fixed-size
//! blocks. Blocks are handed to a sink synchronously on the capture thread;
//! nothing is queued. Stream errors are forwarded to the caller over a
//! channel and are fatal.

use crate::config::{DeviceSelector, EqConfig};
use crate::error::EqError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, error, info, warn};
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::sync::mpsc::Sender;

/// Splits interleaved frames into fixed-length single-channel blocks.
#[derive(Debug)]
pub struct BlockAssembler {
    channels: usize,
    channel: usize,
    downsample: usize,
    /// Frames seen since the last kept sample
    skip: usize,
    block: Vec<f32>,
    block_len: usize,
}

impl BlockAssembler {
    /// `channel` is zero-based and must be below `channels`.
    pub fn new(channels: usize, channel: usize, downsample: usize, block_len: usize) -> Self {
        let block_len = block_len.max(1);
        Self {
            channels: channels.max(1),
            channel,
            downsample: downsample.max(1),
            skip: 0,
            block: Vec::with_capacity(block_len),
            block_len,
        }
    }

    /// Feed interleaved samples; `sink` runs once per completed block.
    pub fn push<F: FnMut(&[f32])>(&mut self, interleaved: &[f32], mut sink: F) {
        for frame in interleaved.chunks(self.channels) {
            let Some(&sample) = frame.get(self.channel) else {
                continue;
            };

            if self.skip == 0 {
                self.block.push(sample);
                if self.block.len() == self.block_len {
                    sink(&self.block);
                    self.block.clear();
                }
            }
            self.skip = (self.skip + 1) % self.downsample;
        }
    }
}

/// RAII guard to suppress stderr during ALSA device enumeration
/// Restores stderr when dropped
struct StderrSuppressor {
    saved_fd: i32,
    dev_null: File,
}

impl StderrSuppressor {
    fn new() -> Option<Self> {
        let dev_null = File::open("/dev/null").ok()?;

        let saved_fd = unsafe { libc::dup(2) };
        if saved_fd < 0 {
            return None;
        }

        if unsafe { libc::dup2(dev_null.as_raw_fd(), 2) } < 0 {
            unsafe { libc::close(saved_fd); }
            return None;
        }

        Some(Self { saved_fd, dev_null })
    }
}

impl Drop for StderrSuppressor {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.saved_fd, 2);
            libc::close(self.saved_fd);
        }
        let _ = &self.dev_null; // Keep dev_null alive until here
    }
}

/// Print every input device of the default host with its index.
pub fn list_devices() -> Result<(), EqError> {
    let host = cpal::default_host();
    let default_name = host
        .default_input_device()
        .and_then(|d| d.name().ok());

    println!("Host: {:?}", host.id());
    for (index, device) in host.input_devices()?.enumerate() {
        let name = device.name()?;
        let marker = if Some(&name) == default_name.as_ref() { '>' } else { ' ' };
        match device.default_input_config() {
            Ok(config) => println!(
                "{} {:>3} {} ({} ch, {} Hz, {:?})",
                marker,
                index,
                name,
                config.channels(),
                config.sample_rate().0,
                config.sample_format()
            ),
            Err(e) => println!("{} {:>3} {} (unavailable: {})", marker, index, name, e),
        }
    }
    Ok(())
}

fn select_device(host: &cpal::Host, selector: Option<&DeviceSelector>) -> Result<cpal::Device, EqError> {
    match selector {
        None => host.default_input_device().ok_or(EqError::NoInputDevice),
        Some(DeviceSelector::Index(index)) => host
            .input_devices()?
            .nth(*index)
            .ok_or_else(|| EqError::DeviceNotFound(index.to_string())),
        Some(DeviceSelector::Name(name)) => {
            let needle = name.to_lowercase();
            for device in host.input_devices()? {
                match device.name() {
                    Ok(n) if n.to_lowercase().contains(&needle) => return Ok(device),
                    Ok(_) => {}
                    Err(e) => warn!("Skipping device with unreadable name: {}", e),
                }
            }
            Err(EqError::DeviceNotFound(name.clone()))
        }
    }
}

/// A built (not yet playing) input stream and the parameters the
/// pipeline needs to be configured with before `play`.
pub struct Capture {
    stream: cpal::Stream,
    stderr_guard: Option<StderrSuppressor>,
    /// Sample rate after downsampling
    pub sample_rate: f64,
    pub block_len: usize,
    pub device_name: String,
}

impl Capture {
    /// Start delivering blocks to the sink.
    pub fn play(&mut self) -> Result<(), EqError> {
        self.stream.play()?;
        self.stderr_guard = None;
        info!("Stream started");
        Ok(())
    }
}

/// Build the input stream without starting it. `sink` receives each block
/// on the capture thread once `Capture::play` runs; stream errors are sent
/// on `errors`.
pub fn open<F>(config: &EqConfig, mut sink: F, errors: Sender<EqError>) -> Result<Capture, EqError>
where
    F: FnMut(&[f32]) + Send + 'static,
{
    // ALSA chatter on stderr would land on the screen; held until play
    let stderr_guard = StderrSuppressor::new();

    let host = cpal::default_host();
    debug!("Host: {:?}", host.id());

    let device = select_device(&host, config.device.as_ref())?;
    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    info!("Device: {}", device_name);

    let supported = device.default_input_config()?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        return Err(EqError::UnsupportedSampleFormat(supported.sample_format()));
    }

    let channels = supported.channels() as usize;
    if config.channel >= channels {
        return Err(EqError::ChannelOutOfRange {
            channel: config.channel + 1,
            available: channels,
        });
    }

    let device_rate = match config.sample_rate {
        Some(rate) => EqConfig::validate_sample_rate(rate)?.round() as u32,
        None => supported.sample_rate().0,
    };

    let stream_config = cpal::StreamConfig {
        channels: supported.channels(),
        sample_rate: cpal::SampleRate(device_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let sample_rate = device_rate as f64 / config.downsample.max(1) as f64;
    let block_len = config.block_len(sample_rate);
    debug!(
        "Config: {} Hz, {} channels, downsample {}, block {} samples",
        device_rate, channels, config.downsample, block_len
    );

    let mut assembler = BlockAssembler::new(channels, config.channel, config.downsample, block_len);

    let stream = device.build_input_stream(
        &stream_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            assembler.push(data, &mut sink);
        },
        move |err| {
            error!("Audio stream error: {}", err);
            let _ = errors.send(EqError::Stream(err));
        },
        None,
    )?;

    Ok(Capture {
        stream,
        stderr_guard,
        sample_rate,
        block_len,
        device_name,
    })
}
