use std::io::Cursor;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::EncodeError;
use crate::kernel::audio::recorder::Utterance;

/// Rate the answer artifact is submitted at, whatever the device captured.
pub const TARGET_RATE: u32 = 16_000;

/// Encode a captured utterance as a mono 16-bit WAV at 16 kHz, in memory.
/// An empty utterance encodes to a valid header-only file.
pub fn utterance_to_wav(utterance: &Utterance) -> Result<Vec<u8>, EncodeError> {
    let frames = if utterance.sample_rate == TARGET_RATE || utterance.frames.is_empty() {
        utterance.frames.clone()
    } else {
        resample(&utterance.frames, utterance.sample_rate, TARGET_RATE)?
    };

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TARGET_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in &frames {
            let clamped = sample.clamp(-1.0, 1.0);
            writer.write_sample((clamped * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Sinc resample, chunked so arbitrary utterance lengths work. The final
/// partial chunk is padded with its own last sample and the output trimmed
/// back to the expected length.
fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, EncodeError> {
    if from_rate == 0 {
        return Err(EncodeError::Resample("zero input rate".to_string()));
    }
    let ratio = to_rate as f64 / from_rate as f64;
    let chunk = 1024usize;

    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk, 1)
        .map_err(|e| EncodeError::Resample(e.to_string()))?;

    let expected = (input.len() as f64 * ratio).round() as usize;
    let mut out = Vec::with_capacity(expected + chunk);
    let mut seg = vec![0.0f32; chunk];
    let mut idx = 0usize;

    while idx < input.len() {
        let end = (idx + chunk).min(input.len());
        let len = end - idx;
        let pad = input[end - 1];
        seg.fill(pad);
        seg[..len].copy_from_slice(&input[idx..end]);
        let produced = resampler
            .process(std::slice::from_ref(&seg), None)
            .map_err(|e| EncodeError::Resample(e.to_string()))?;
        out.extend_from_slice(&produced[0]);
        idx = end;
    }

    out.truncate(expected);
    Ok(out)
}
