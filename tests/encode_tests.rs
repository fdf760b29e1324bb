use std::io::Cursor;

use uuid::Uuid;
use viva::audio::encode::{utterance_to_wav, TARGET_RATE};
use viva::kernel::audio::recorder::Utterance;

fn utterance(frames: Vec<f32>, sample_rate: u32) -> Utterance {
    Utterance {
        id: Uuid::new_v4(),
        frames,
        sample_rate,
        started_at_ms: 0,
        ended_at_ms: 0,
    }
}

#[test]
fn test_wav_at_target_rate_is_passthrough() {
    let utt = utterance(vec![0.25; 16_000], TARGET_RATE); // 1s
    let wav = utterance_to_wav(&utt).expect("encodes");

    let reader = hound::WavReader::new(Cursor::new(wav)).expect("valid wav");
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, TARGET_RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(reader.len(), 16_000, "one sample out per sample in");
}

#[test]
fn test_empty_utterance_encodes_header_only() {
    let utt = utterance(Vec::new(), 48_000);
    let wav = utterance_to_wav(&utt).expect("empty capture still encodes");

    let reader = hound::WavReader::new(Cursor::new(wav)).expect("valid wav");
    assert_eq!(reader.len(), 0);
    assert_eq!(reader.spec().sample_rate, TARGET_RATE);
}

#[test]
fn test_downsamples_to_target_rate() {
    // 300ms at 48kHz -> 300ms at 16kHz.
    let utt = utterance(vec![0.1; 14_400], 48_000);
    let wav = utterance_to_wav(&utt).expect("encodes");

    let reader = hound::WavReader::new(Cursor::new(wav)).expect("valid wav");
    assert_eq!(reader.spec().sample_rate, TARGET_RATE);
    assert_eq!(reader.len(), 4800, "third of the samples at a third of the rate");
}

#[test]
fn test_sample_clamping() {
    // Out-of-range floats must not wrap when converted to i16.
    let utt = utterance(vec![2.0, -2.0, 0.0], TARGET_RATE);
    let wav = utterance_to_wav(&utt).expect("encodes");

    let mut reader = hound::WavReader::new(Cursor::new(wav)).expect("valid wav");
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples[0], i16::MAX);
    assert_eq!(samples[1], -i16::MAX);
    assert_eq!(samples[2], 0);
}
