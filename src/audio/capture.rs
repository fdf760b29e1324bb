use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::Producer;
use tracing::{error, info};

use crate::error::DeviceError;

/// Owns the microphone stream for the session lifetime. Samples land in a
/// ring buffer; the device callback never does anything slower than a push.
/// Dropping this releases the device.
pub struct AudioCapture {
    _stream: cpal::Stream,
    pub sample_rate: u32,
}

impl AudioCapture {
    pub fn new<P>(mut producer: P) -> Result<Self, DeviceError>
    where
        P: Producer<Item = f32> + Send + 'static,
    {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(DeviceError::NoInputDevice)?;

        info!("audio input device: {}", device.name().unwrap_or_default());

        // Prefer the standard speech rates; 16k keeps the rest of the
        // pipeline cheap.
        let target_rates = [16000, 32000, 48000, 44100, 8000];
        let mut selected_config = None;
        let mut selected_rate = 0;

        for &rate in &target_rates {
            let configs = device
                .supported_input_configs()
                .map_err(|e| DeviceError::Stream(e.to_string()))?;
            for config_range in configs {
                if config_range.min_sample_rate().0 <= rate
                    && config_range.max_sample_rate().0 >= rate
                {
                    selected_config = Some(config_range.with_sample_rate(cpal::SampleRate(rate)));
                    selected_rate = rate;
                    break;
                }
            }
            if selected_config.is_some() {
                break;
            }
        }

        let config = match selected_config {
            Some(c) => c,
            None => {
                let def = device
                    .default_input_config()
                    .map_err(|e| DeviceError::Stream(e.to_string()))?;
                let rate = def.sample_rate().0;
                if !target_rates.contains(&rate) {
                    return Err(DeviceError::UnsupportedRate(rate));
                }
                selected_rate = rate;
                def
            }
        };

        info!(
            "audio config: rate={}Hz channels={}",
            selected_rate,
            config.channels()
        );

        let err_fn = |err| error!("audio stream error: {}", err);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device
                .build_input_stream(
                    &config.into(),
                    move |data: &[f32], _: &_| write_input_data(data, &mut producer),
                    err_fn,
                    None,
                )
                .map_err(|e| DeviceError::Stream(e.to_string()))?,
            cpal::SampleFormat::I16 => device
                .build_input_stream(
                    &config.into(),
                    move |data: &[i16], _: &_| write_input_data_i16(data, &mut producer),
                    err_fn,
                    None,
                )
                .map_err(|e| DeviceError::Stream(e.to_string()))?,
            _ => return Err(DeviceError::UnsupportedFormat),
        };

        stream
            .play()
            .map_err(|e| DeviceError::Stream(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            sample_rate: selected_rate,
        })
    }
}

fn write_input_data<P>(input: &[f32], producer: &mut P)
where
    P: Producer<Item = f32>,
{
    // Lossy when the consumer falls behind; dropping beats blocking the
    // device callback.
    producer.push_slice(input);
}

fn write_input_data_i16<P>(input: &[i16], producer: &mut P)
where
    P: Producer<Item = f32>,
{
    for &sample in input {
        let sample_f32 = sample as f32 / i16::MAX as f32;
        let _ = producer.try_push(sample_f32);
    }
}
