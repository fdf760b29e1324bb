use viva::kernel::audio::energy;
use viva::kernel::audio::vad::{TurnDetector, VadCommand, VadConfig, VadState};

fn detector() -> TurnDetector {
    let mut vad = TurnDetector::new(VadConfig::default());
    vad.arm();
    vad
}

#[test]
fn test_rms_energy() {
    assert_eq!(energy::rms(&[]), 0.0, "empty block is silent");
    assert_eq!(energy::rms(&[0.0; 2048]), 0.0, "zero block is silent");

    // A constant-amplitude block has RMS equal to the amplitude.
    let block = vec![0.5f32; 1024];
    assert!((energy::rms(&block) - 0.5).abs() < 1e-6);

    // Sign does not matter.
    let mut alternating = vec![0.1f32; 1024];
    for (i, s) in alternating.iter_mut().enumerate() {
        if i % 2 == 0 {
            *s = -0.1;
        }
    }
    assert!((energy::rms(&alternating) - 0.1).abs() < 1e-6);
}

#[test]
fn test_turn_taking_cycle() {
    let mut vad = detector();
    assert_eq!(vad.state(), VadState::Listening);

    // Speech starts capture exactly once.
    assert_eq!(vad.on_loudness(0.1, 0), Some(VadCommand::StartCapture));
    assert_eq!(vad.state(), VadState::Speaking);
    assert_eq!(vad.on_loudness(0.1, 100), None, "no double start");

    // Silence begins at t0=3000.
    assert_eq!(vad.on_loudness(0.01, 3000), None);
    assert_eq!(vad.on_loudness(0.01, 4900), None, "1.9s is not enough");
    assert_eq!(
        vad.on_loudness(0.01, 5000),
        Some(VadCommand::StopCapture),
        "2s of continuous silence stops capture"
    );
    assert_eq!(vad.state(), VadState::Processing);

    // Everything is ignored until the round-trip completes.
    assert_eq!(vad.on_loudness(0.5, 5100), None);
    assert_eq!(vad.on_loudness(0.01, 5200), None);

    vad.resume_listening();
    assert_eq!(vad.state(), VadState::Listening);
    assert_eq!(vad.on_loudness(0.1, 6000), Some(VadCommand::StartCapture));
    println!("Step passed: full listen/speak/process cycle");
}

#[test]
fn test_speech_resets_silence_clock() {
    let mut vad = detector();
    assert_eq!(vad.on_loudness(0.1, 0), Some(VadCommand::StartCapture));

    // Pause... then the candidate resumes just before the cutoff.
    assert_eq!(vad.on_loudness(0.005, 1000), None);
    assert_eq!(vad.on_loudness(0.005, 2900), None);
    assert_eq!(vad.on_loudness(0.1, 2950), None, "speech resets the clock");

    // The window restarts from the next silent sample.
    assert_eq!(vad.on_loudness(0.005, 3000), None);
    assert_eq!(vad.on_loudness(0.005, 4950), None, "only 1950ms since reset");
    assert_eq!(vad.on_loudness(0.005, 5000), Some(VadCommand::StopCapture));
}

#[test]
fn test_agent_speech_is_suppressed() {
    let mut vad = detector();
    vad.set_agent_speaking(true);

    // A loud burst entirely inside the agent's own playback never starts
    // capture, no matter the magnitude.
    for t in (0..2000).step_by(100) {
        assert_eq!(vad.on_loudness(0.9, t), None, "suppressed while agent speaks");
    }
    assert_eq!(vad.state(), VadState::Listening);

    vad.set_agent_speaking(false);
    assert_eq!(vad.on_loudness(0.9, 2100), Some(VadCommand::StartCapture));
    println!("Step passed: own voice never reads as candidate speech");
}

#[test]
fn test_suppression_does_not_leak_silence_state() {
    let mut vad = detector();
    assert_eq!(vad.on_loudness(0.1, 0), Some(VadCommand::StartCapture));
    assert_eq!(vad.on_loudness(0.005, 500), None, "silence clock set at 500");

    // Samples delivered while the gate is up are discarded outright, so the
    // silence clock neither advances nor resets.
    vad.set_agent_speaking(true);
    assert_eq!(vad.on_loudness(0.9, 2000), None);
    vad.set_agent_speaking(false);

    assert_eq!(vad.on_loudness(0.005, 2499), None, "1999ms since t0");
    assert_eq!(vad.on_loudness(0.005, 2500), Some(VadCommand::StopCapture));
}

#[test]
fn test_idle_until_armed() {
    let mut vad = TurnDetector::new(VadConfig::default());
    assert_eq!(vad.state(), VadState::Idle);
    assert_eq!(vad.on_loudness(0.5, 0), None, "idle discards input");

    vad.arm();
    assert_eq!(vad.state(), VadState::Listening);
    // Arming twice is harmless.
    vad.arm();
    assert_eq!(vad.state(), VadState::Listening);
}

#[test]
fn test_threshold_is_tunable() {
    let mut vad = TurnDetector::new(VadConfig {
        energy_threshold: 0.2,
        silence_window_ms: 500,
    });
    vad.arm();

    assert_eq!(vad.on_loudness(0.1, 0), None, "below the raised threshold");
    assert_eq!(vad.on_loudness(0.3, 100), Some(VadCommand::StartCapture));
    assert_eq!(vad.on_loudness(0.1, 200), None);
    assert_eq!(vad.on_loudness(0.1, 700), Some(VadCommand::StopCapture), "short window");
}
