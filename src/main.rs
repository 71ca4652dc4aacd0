//! Inshight CLI
//!
//! Usage:
//!   inshight --report session.json          # Report for a saved payload
//!   inshight --report                       # Report for the stored session
//!   inshight --replay frames.jsonl --save   # Replay recorded landmarks
//!   inshight --serve                        # HTTP API server
//!   inshight --ask "where did they stall?"  # Ask the LLM about the stored session

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use inshight::config::PipelineConfig;
use inshight::core::{analyze, generate_report, parse_frames, run_server, AskClient, Replayer, SessionStore};
use inshight::types::{SessionMode, SessionPayload};
use inshight::{logging, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "inshight",
    version = VERSION,
    about = "Inshight - engagement and emotion signals from facial landmarks",
    long_about = "Inshight turns per-frame facial landmarks into a 1 Hz stream of\n\
                  gaze, smile, eyebrow and emotion signals, flags likely confusion\n\
                  moments and summarizes a session into a short report.\n\n\
                  Modes:\n  \
                  --report [FILE]  Report for a payload file or the stored session\n  \
                  --replay FILE    Replay recorded landmark frames (JSON Lines)\n  \
                  --serve          HTTP API server mode\n  \
                  --ask QUESTION   Ask the LLM endpoint about the stored session"
)]
struct Args {
    /// Report for a session payload file (stored session when no file given)
    #[arg(short, long, num_args = 0..=1, value_name = "FILE")]
    report: Option<Option<PathBuf>>,

    /// Replay landmark frames from a JSON Lines file
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Session mode for replays without explicit start events
    #[arg(long, default_value = "task", value_parser = parse_mode)]
    mode: SessionMode,

    /// Write the replayed session to the store slot
    #[arg(long)]
    save: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Ask a question about the stored session
    #[arg(long, value_name = "QUESTION")]
    ask: Option<String>,

    /// Pipeline config (JSON); defaults when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Session store slot
    #[arg(long, default_value = "./inshight-session.json")]
    store: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Include analytics series with the report
    #[arg(long)]
    analytics: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_mode(s: &str) -> Result<SessionMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "task" => Ok(SessionMode::Task),
        "activity" => Ok(SessionMode::Activity),
        other => Err(format!("unknown mode '{}', expected task or activity", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = PipelineConfig::load_or_default(args.config.as_deref())
        .with_context(|| format!("loading config {:?}", args.config))?;
    let store = SessionStore::new(&args.store);

    if args.serve {
        run_serve(&args, config, store).await
    } else if let Some(path) = &args.replay {
        run_replay(path, &args, &config, &store)
    } else if let Some(question) = &args.ask {
        run_ask(question, &config, &store).await
    } else {
        let file = args.report.clone().flatten();
        run_report(file.as_deref(), &args, &config, &store)
    }
}

/// Payload file (raw or store envelope), or the store slot
fn load_payload(file: Option<&Path>, store: &SessionStore) -> Result<SessionPayload> {
    match file {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            match serde_json::from_str::<SessionPayload>(&text) {
                Ok(payload) => Ok(payload),
                Err(raw_err) => SessionStore::new(path)
                    .try_load()
                    .ok()
                    .flatten()
                    .with_context(|| format!("{} is not a session payload: {}", path.display(), raw_err)),
            }
        }
        None => match store.load() {
            Some(payload) => Ok(payload),
            None => bail!("no stored session at {}", store.path().display()),
        },
    }
}

fn run_report(file: Option<&Path>, args: &Args, config: &PipelineConfig, store: &SessionStore) -> Result<()> {
    let payload = load_payload(file, store)?;
    print_report(&payload, args, config)
}

fn print_report(payload: &SessionPayload, args: &Args, config: &PipelineConfig) -> Result<()> {
    let report = generate_report(payload, config);

    if args.json {
        #[derive(serde::Serialize)]
        struct ReportOutput<'a> {
            report: &'a Option<inshight::types::Report>,
            #[serde(skip_serializing_if = "Option::is_none")]
            analytics: Option<inshight::core::SessionAnalytics>,
        }
        let out = ReportOutput {
            report: &report,
            analytics: args.analytics.then(|| analyze(payload, &config.engagement)),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_header(payload);
    let Some(report) = report else {
        println!("{}", "No report: the session has no points.".yellow());
        return Ok(());
    };

    if args.no_color {
        println!("{}", report.to_parseable_string());
        for insight in &report.insights {
            println!("  - {}", insight);
        }
    } else {
        print!("{}", report.to_terminal_string());
    }

    if args.analytics {
        let a = analyze(payload, &config.engagement);
        println!();
        println!("{}", "Engagement by gaze".bold());
        for g in &a.engagement_by_gaze {
            println!("  {:<13} {:>5.2}  ({} s)", g.zone.label(), g.avg_engagement, g.samples);
        }
    }
    Ok(())
}

fn print_header(payload: &SessionPayload) {
    println!();
    println!("{}", format!("Inshight v{}", VERSION).bold());
    println!(
        "{}",
        format!(
            "{:?} session started {} | {} points | {} snapshots | {:.0}s",
            payload.mode,
            payload.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            payload.points.len(),
            payload.snapshots.len(),
            payload.duration_secs()
        )
        .dimmed()
    );
    println!();
}

fn run_replay(path: &Path, args: &Args, config: &PipelineConfig, store: &SessionStore) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let frames = parse_frames(BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))?;
    if frames.is_empty() {
        bail!("{} contains no frames", path.display());
    }

    let payload = Replayer::new(args.mode, config.clone()).run(&frames);

    if args.save {
        store.save(&payload).context("saving replayed session")?;
        eprintln!("{} {}", "saved to".green(), store.path().display());
    }
    print_report(&payload, args, config)
}

async fn run_ask(question: &str, config: &PipelineConfig, store: &SessionStore) -> Result<()> {
    let payload = load_payload(None, store)?;
    let client = AskClient::from_env(config.ask.clone())?;

    eprintln!("{}", "Asking...".dimmed());
    let answer = client.ask(question, &payload).await?;
    println!("{}", answer);
    Ok(())
}

/// Run HTTP API server
async fn run_serve(args: &Args, config: PipelineConfig, store: SessionStore) -> Result<()> {
    println!();
    println!("{}", format!("Inshight API Server v{}", VERSION).bold());
    println!("{}", format!("store: {}", store.path().display()).dimmed());
    println!();

    run_server(&args.addr, config, store).await
}
