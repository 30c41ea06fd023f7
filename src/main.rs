use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use steady_emotion::config::Config;
use steady_emotion::error::{Result, SteadyEmotionError};
use steady_emotion::models::display_name;
use steady_emotion::session::{pump, FrameAnnotation, Session};
use steady_emotion::source::{forward_lines, LineSource, SessionTimer};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Smooths per-frame emotion labels into a steady emotion with feedback,
/// then reports time spent in each emotion
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Label stream to read (`<label>` or `<seconds> <label>` per line); stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Majority-vote window size (overrides config)
    #[arg(long)]
    window: Option<usize>,

    /// Seconds between accepted emotion changes; 0 disables (overrides config)
    #[arg(long)]
    cooldown: Option<f64>,

    /// Seed for feedback selection (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Input timestamps are authoritative: end the session at the last frame
    #[arg(long)]
    replay: bool,

    /// Write the session report as JSON
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Width of the longest bar in the frequency chart
    #[arg(long, default_value = "40")]
    chart_width: usize,

    /// Log to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initializes logging: a plain file when requested, stderr otherwise
fn init_logging(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let log_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let file_layer = fmt::layer().with_writer(Arc::new(file)).with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .init();
        }
        None => {
            let stderr_layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(window) = args.window {
        config.window_capacity = window;
    }
    if let Some(cooldown) = args.cooldown {
        config.cooldown_secs = cooldown;
    }
    if let Some(seed) = args.seed {
        config.feedback_seed = Some(seed);
    }
    config.validate()?;
    Ok(config)
}

/// Label reader: a tokio task for files, a plain thread for stdin
enum Reader {
    Task(tokio::task::JoinHandle<Result<()>>),
    Thread(std::thread::JoinHandle<Result<()>>),
}

impl Reader {
    /// Outcome of a reader whose stream has ended
    async fn finish(self) -> Result<()> {
        match self {
            Reader::Task(handle) => handle.await.unwrap_or_else(|e| {
                warn!("Label reader task ended abnormally: {}", e);
                Ok(())
            }),
            // the frame channel closes only once the thread has returned
            Reader::Thread(handle) => handle.join().unwrap_or_else(|_| {
                warn!("Label reader thread panicked");
                Ok(())
            }),
        }
    }

    /// Stops reading without waiting for more input. A stdin thread stays
    /// blocked in its read until the next line or process exit.
    fn stop(self) {
        match self {
            Reader::Task(handle) => handle.abort(),
            Reader::Thread(_) => {}
        }
    }
}

fn print_annotation(annotation: &FrameAnnotation) {
    if annotation.transitioned {
        let emotion = annotation
            .emotion
            .as_deref()
            .map(display_name)
            .unwrap_or_else(|| "None".to_string());
        println!("Emotion: {emotion} | Feedback: {}", annotation.feedback);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.verbose)?;

    let config = load_config(&args)?;
    info!(
        "Starting session: window={} cooldown={}s",
        config.window_capacity, config.cooldown_secs
    );

    let timer = SessionTimer::start();
    let mut session = Session::from_config(&config, 0.0)?;

    let (frame_sender, mut frame_receiver) = mpsc::channel(config.channel_capacity);
    let reader = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            Reader::Task(tokio::spawn(pump(
                LineSource::new(BufReader::new(file), timer),
                frame_sender,
            )))
        }
        None => Reader::Thread(std::thread::spawn(move || {
            forward_lines(std::io::stdin().lock(), timer, frame_sender)
        })),
    };

    let mut failure: Option<SteadyEmotionError> = None;
    let interrupted = tokio::select! {
        result = session.drain(&mut frame_receiver, print_annotation) => {
            if let Err(e) = result {
                error!("Frame processing stopped: {}", e);
                failure = Some(e);
            }
            false
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, stopping...");
            true
        }
    };
    drop(frame_receiver);

    if interrupted || failure.is_some() {
        reader.stop();
    } else if let Err(e) = reader.finish().await {
        error!("Label stream failed: {}", e);
        failure = Some(e);
    }

    let end = if args.replay {
        session.last_timestamp()
    } else {
        timer.now_secs().max(session.last_timestamp())
    };
    let report = session.finish(end)?;

    println!("\n--- Session Summary ---");
    for line in report.summary_lines() {
        println!("{line}");
    }
    println!("\n{}", report.frequency_chart(args.chart_width));

    if let Some(path) = &args.report_json {
        report.save_json(path)?;
        info!("Report written to {:?}", path);
    }

    println!("Thank you for using the Emotion Detection System. Have a great day!");

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
