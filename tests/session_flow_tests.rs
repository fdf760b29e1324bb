use viva::kernel::audio::vad::{VadConfig, VadState};
use viva::kernel::event::{AnswerSignal, Event, InputEvent, SynthSignal};
use viva::kernel::presence::PresenceConfig;
use viva::kernel::reactor::{Reactor, ReactorConfig, SideEffect, TerminationCause};
use viva::services::interview::types::Prompt;

const RATE: u32 = 16_000;
const BLOCK: usize = 1600; // 100ms of audio per block

fn reactor(duration_secs: u64) -> Reactor {
    Reactor::new(
        ReactorConfig {
            vad: VadConfig::default(),
            presence: PresenceConfig::default(),
            duration_secs,
            sample_rate: RATE,
        },
        "session-under-test".to_string(),
    )
}

fn prompt_event(text: &str) -> Event {
    Event::Answer(AnswerSignal::NextPrompt(Prompt {
        question_text: text.to_string(),
    }))
}

fn loud(at_ms: u64) -> Event {
    Event::Input(InputEvent::audio(vec![0.1; BLOCK], at_ms))
}

fn quiet(at_ms: u64) -> Event {
    Event::Input(InputEvent::audio(vec![0.0; BLOCK], at_ms))
}

fn started(generation: u64) -> Event {
    Event::Input(InputEvent::synth(SynthSignal::Started { generation }))
}

fn finished(generation: u64) -> Event {
    Event::Input(InputEvent::synth(SynthSignal::Finished { generation }))
}

#[test]
fn test_answer_turn_end_to_end() {
    let mut reactor = reactor(600);

    // Opening prompt arrives through the same path as every later one.
    let effects = reactor.tick_step(vec![prompt_event("Tell me about yourself.")]);
    let generation = match effects.as_slice() {
        [SideEffect::Speak { generation, text }] => {
            assert_eq!(text, "Tell me about yourself.");
            *generation
        }
        other => panic!("expected a single Speak effect, got {:?}", other),
    };
    assert_eq!(reactor.vad_state(), VadState::Listening);

    // The interviewer is talking; the microphone hears it loudly. Nothing
    // may be captured.
    let mut effects = reactor.tick_step(vec![started(generation)]);
    for t in (0..1500).step_by(100) {
        effects.extend(reactor.tick_step(vec![loud(t)]));
    }
    assert!(effects.is_empty(), "own playback must not start a capture");
    assert!(!reactor.is_capturing());
    println!("Step 1 passed: input suppressed while the interviewer speaks");

    reactor.tick_step(vec![finished(generation)]);

    // Candidate answers for 3 seconds.
    let mut effects = Vec::new();
    for t in (2000..5000).step_by(100) {
        effects.extend(reactor.tick_step(vec![loud(t)]));
    }
    assert!(effects.is_empty(), "capture itself is not an outward effect");
    assert!(reactor.is_capturing());
    assert_eq!(reactor.vad_state(), VadState::Speaking);

    // A 1.9s pause is not the end of the answer.
    let mut effects = Vec::new();
    for t in (5000..6900).step_by(100) {
        effects.extend(reactor.tick_step(vec![quiet(t)]));
    }
    assert!(effects.is_empty(), "1.9s of silence must not emit");
    assert!(reactor.is_capturing());

    // Speech resumes briefly, then a full 2s pause closes the utterance.
    reactor.tick_step(vec![loud(6900)]);
    let mut submitted = None;
    for t in (7000..=9100).step_by(100) {
        for effect in reactor.tick_step(vec![quiet(t)]) {
            match effect {
                SideEffect::Submit(utterance) => submitted = Some(utterance),
                other => panic!("unexpected effect {:?}", other),
            }
        }
    }
    let utterance = submitted.expect("exactly one utterance emitted");
    assert!(!reactor.is_capturing());
    assert_eq!(reactor.vad_state(), VadState::Processing);
    assert!(
        utterance.duration_ms() >= 3000,
        "utterance carries the 3s answer (got {}ms)",
        utterance.duration_ms()
    );
    println!("Step 2 passed: one utterance per answer, silence-bounded");

    // While the round-trip is in flight, more speech is ignored.
    let effects = reactor.tick_step(vec![loud(9200), loud(9300)]);
    assert!(effects.is_empty(), "Processing ignores the microphone");
    assert!(!reactor.is_capturing());

    // Next prompt returns the machine to Listening and speaks it.
    let effects = reactor.tick_step(vec![prompt_event("Q2")]);
    match effects.as_slice() {
        [SideEffect::Speak { text, .. }] => assert_eq!(text, "Q2"),
        other => panic!("expected Speak(Q2), got {:?}", other),
    }
    assert_eq!(reactor.vad_state(), VadState::Listening);
    assert_eq!(reactor.current_prompt().unwrap().question_text, "Q2");
    println!("Step 3 passed: round-trip resumes listening with the next prompt");
}

#[test]
fn test_no_questions_left_terminates() {
    let mut reactor = reactor(600);
    reactor.tick_step(vec![prompt_event("Q1")]);

    let effects = reactor.tick_step(vec![Event::Answer(AnswerSignal::InterviewFinished)]);
    assert!(
        matches!(
            effects.as_slice(),
            [SideEffect::Terminate(TerminationCause::InterviewComplete)]
        ),
        "end-of-interview signal terminates, got {:?}",
        effects
    );
    assert!(reactor.is_terminating());
}

#[test]
fn test_submission_failure_reaches_terminal_state() {
    let mut reactor = reactor(600);
    reactor.tick_step(vec![prompt_event("Q1")]);

    let effects = reactor.tick_step(vec![Event::Answer(AnswerSignal::SubmissionFailed(
        "connection reset".to_string(),
    ))]);
    match effects.as_slice() {
        [SideEffect::Terminate(TerminationCause::SubmissionFailed(reason))] => {
            assert_eq!(reason, "connection reset");
        }
        other => panic!("expected failure termination, got {:?}", other),
    }
}

#[test]
fn test_clock_expiry_forces_termination_once() {
    let mut reactor = reactor(3);
    reactor.tick_step(vec![prompt_event("Q1")]);

    // Candidate starts answering and never pauses; the detector would hang
    // in Speaking forever if the clock did not intervene.
    for t in (0..1000).step_by(100) {
        reactor.tick_step(vec![loud(t)]);
    }
    assert!(reactor.is_capturing());

    // The candidate also walked away mid-answer.
    reactor.tick_step(vec![Event::Input(InputEvent::presence(0, 1000))]);

    let mut countdowns = 0;
    let mut terminations = 0;
    for _ in 0..6 {
        for effect in reactor.tick_step(vec![Event::Input(InputEvent::clock_second())]) {
            match effect {
                SideEffect::CountdownDisplay { .. } => countdowns += 1,
                SideEffect::Terminate(TerminationCause::TimeExpired) => terminations += 1,
                other => panic!("unexpected effect {:?}", other),
            }
        }
    }
    assert_eq!(countdowns, 2, "two display ticks before expiry");
    assert_eq!(terminations, 1, "expiry terminates exactly once");
    assert!(!reactor.is_capturing(), "in-progress capture force-stopped");
    println!("Step passed: expiry is idempotent and unsticks the detector");

    // Finalization flushes the still-open missing episode, rounded.
    let stats = reactor.finalize(4300);
    assert_eq!(stats.face_missing_seconds, 3, "3.3s away rounds to 3");
    assert_eq!(stats.summary.face_missing_seconds, 3);
    assert_eq!(stats.summary.prompts_spoken, 1);
    assert_eq!(stats.summary.utterances_captured, 0, "partial capture discarded");
}

#[test]
fn test_presence_alert_effect() {
    let mut reactor = reactor(600);
    reactor.tick_step(vec![prompt_event("Q1")]);
    reactor.tick_step(vec![Event::Input(InputEvent::presence(1, 500))]);

    let mut alerts = 0;
    for t in (1000..=9000).step_by(500) {
        for effect in reactor.tick_step(vec![Event::Input(InputEvent::presence(0, t))]) {
            match effect {
                SideEffect::PresenceAlert => alerts += 1,
                other => panic!("unexpected effect {:?}", other),
            }
        }
    }
    assert_eq!(alerts, 1, "one alert per missing episode");
}

#[test]
fn test_events_after_termination_are_inert() {
    let mut reactor = reactor(600);
    reactor.tick_step(vec![prompt_event("Q1")]);

    let effects = reactor.tick_step(vec![Event::Input(InputEvent::end_requested())]);
    assert!(matches!(
        effects.as_slice(),
        [SideEffect::Terminate(TerminationCause::UserEnded)]
    ));

    // A late answer, more audio, clock ticks, a second end request: all
    // dropped, no further effects of any kind.
    let effects = reactor.tick_step(vec![
        prompt_event("Q-late"),
        loud(10_000),
        Event::Input(InputEvent::clock_second()),
        Event::Input(InputEvent::end_requested()),
    ]);
    assert!(effects.is_empty(), "terminated session stays quiet, got {:?}", effects);
}
