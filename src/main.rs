use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use ringbuf::traits::Split;
use ringbuf::HeapRb;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use viva::audio::blocks::BlockAssembler;
use viva::audio::capture::AudioCapture;
use viva::config::Args;
use viva::kernel::event::{Event, InputEvent};
use viva::kernel::reactor::{Reactor, ReactorConfig};
use viva::kernel::time::SessionTimer;
use viva::outputs::synthesizer::ProcessSynthesizer;
use viva::services::interview::client::InterviewClient;
use viva::services::interview::types::AgentPersona;
use viva::session::orchestrator::{DeviceHandles, Orchestrator};
use viva::vision::pipeline::PresencePipeline;
use viva::vision::stub::{AlwaysPresentDetector, StillFrameSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let args = Args::parse();
    tracing::info!("viva starting against {}", args.server);

    let api = InterviewClient::new(
        &args.server,
        Duration::from_secs(args.request_timeout_secs),
    );

    // Persona: either pre-built on disk, or built now from the uploaded
    // job description and resume.
    let persona = resolve_persona(&api, &args).await?;

    let start = api
        .start_session(persona, args.duration_minutes)
        .await
        .context("failed to start interview session")?;
    tracing::info!("first question: {}", start.first_question.question_text);

    // One event channel; every source below is registered exactly once.
    let (tx, rx) = mpsc::channel::<Event>(256);
    let timer = SessionTimer::start();
    let shutdown = CancellationToken::new();

    // Audio: device callback -> ring buffer -> block assembler -> kernel.
    // No microphone is fatal; the session cannot start without one.
    let ring = HeapRb::<f32>::new(32_768);
    let (producer, consumer) = ring.split();
    let capture = AudioCapture::new(producer)
        .context("microphone access is required for the interview")?;
    let sample_rate = capture.sample_rate;

    let assembler = BlockAssembler::new(consumer, tx.clone(), timer.clone(), args.block_size);
    std::thread::spawn(move || assembler.run());

    // Presence: fixed-cadence detector poll on its own thread.
    let pipeline = PresencePipeline::new(
        tx.clone(),
        timer.clone(),
        Box::new(StillFrameSource::new()),
        Box::new(AlwaysPresentDetector),
        Duration::from_millis(args.presence_poll_ms),
        shutdown.clone(),
    );
    std::thread::spawn(move || pipeline.run());

    // Session countdown, one tick per wall-clock second.
    let clock_tx = tx.clone();
    let clock_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let mut seconds = tokio::time::interval(Duration::from_secs(1));
        seconds.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        seconds.tick().await; // immediate first tick
        loop {
            tokio::select! {
                _ = seconds.tick() => {
                    if clock_tx.send(Event::Input(InputEvent::clock_second())).await.is_err() {
                        break;
                    }
                }
                _ = clock_shutdown.cancelled() => break,
            }
        }
    });

    // Ctrl-C ends the session through the normal termination path.
    let end_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("end requested by user");
            let _ = end_tx.send(Event::Input(InputEvent::end_requested())).await;
        }
    });

    let reactor = Reactor::new(
        ReactorConfig {
            vad: args.vad_config(),
            presence: args.presence_config(),
            duration_secs: args.duration_minutes * 60,
            sample_rate,
        },
        start.session_id.clone(),
    );

    let synthesizer = Box::new(ProcessSynthesizer::new(args.tts_command.clone(), tx.clone()));

    let orchestrator = Orchestrator::new(
        reactor,
        rx,
        tx,
        api,
        start.session_id,
        synthesizer,
        timer,
        DeviceHandles { capture, shutdown },
        args.report_out.clone(),
    );

    orchestrator.bootstrap(start.first_question).await?;
    orchestrator.run().await
}

async fn resolve_persona(api: &InterviewClient, args: &Args) -> anyhow::Result<AgentPersona> {
    if let Some(path) = &args.persona {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read persona file {}", path.display()))?;
        return Ok(AgentPersona(serde_json::from_str(&raw)?));
    }

    let (Some(jd_path), Some(resume_path)) = (&args.jd, &args.resume) else {
        anyhow::bail!("provide --persona, or --jd and --resume to build one");
    };

    let jd_bytes = std::fs::read(jd_path)
        .with_context(|| format!("failed to read {}", jd_path.display()))?;
    let resume_bytes = std::fs::read(resume_path)
        .with_context(|| format!("failed to read {}", resume_path.display()))?;

    let jd = api
        .upload_jd(&file_name(jd_path), jd_bytes)
        .await
        .context("job description upload failed")?;
    let resume = api
        .upload_resume(&file_name(resume_path), resume_bytes)
        .await
        .context("resume upload failed")?;

    tracing::info!("documents uploaded, building interviewer persona");
    Ok(api.build_persona(jd, resume).await?)
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}
