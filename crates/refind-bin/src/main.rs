//! refind entrypoint.
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use core_actions::ReplaceOutcome;
use core_config::{Config, load_from};
use core_events::{EVENTS_DISPATCHED, EVENTS_QUEUED, LOAD_SIGNALS, MODIFIED_SIGNALS};
use core_results::{Report, locate, parse_last_block, render, search_texts};
use core_text::normalize_line_endings;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::sync::atomic::Ordering;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

mod session;

use session::{ApplyRequest, run_apply};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "refind", version, about = "Write edits made in Find Results reports back to their files")]
struct Args {
    /// Optional configuration file path (overrides discovery of `refind.toml`).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// Log to stderr instead of `refind.log`.
    #[arg(long = "log-stderr", global = true)]
    pub log_stderr: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search files for a literal query and print a Find Results report.
    Search {
        query: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Context lines around each match.
        #[arg(short = 'C', long, default_value_t = 0)]
        context: usize,
    },
    /// Print the snapshot of the last results block in a report file.
    Parse {
        report: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Propagate the differences between two reports to the files they list.
    Apply {
        baseline: PathBuf,
        edited: PathBuf,
        /// Save and close the files that had to be opened.
        #[arg(long)]
        save_and_close: bool,
        /// Files already open in the session (changed immediately).
        #[arg(long = "open")]
        open: Vec<PathBuf>,
        /// Write every changed file at the end.
        #[arg(long)]
        write: bool,
    },
    /// Print `path:line` for a byte offset in a report.
    Locate { report: PathBuf, offset: usize },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Search { .. } => "search",
            Command::Parse { .. } => "parse",
            Command::Apply { .. } => "apply",
            Command::Locate { .. } => "locate",
        }
    }
}

fn configure_logging(log_stderr: bool) -> Option<WorkerGuard> {
    let (nb_writer, guard) = if log_stderr {
        tracing_appender::non_blocking(std::io::stderr())
    } else {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("refind.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }
        tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, "refind.log"))
    };
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_err) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Read a text file, normalizing line endings to LF.
fn read_text(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(normalize_line_endings(&raw).normalized)
}

/// Search `paths` for `query`. Section lines only parse back as absolute
/// paths, so relative arguments are resolved against the working directory.
fn search_report(query: &str, paths: &[PathBuf], context: usize) -> Result<Report> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let absolute = std::path::absolute(path)
            .with_context(|| format!("resolving {}", path.display()))?;
        let text = read_text(&absolute)?;
        sources.push((absolute, text));
    }
    Ok(search_texts(
        query,
        sources.iter().map(|(p, t)| (p.clone(), t.as_str())),
        context,
    ))
}

fn run_search(query: &str, paths: &[PathBuf], context: usize) -> Result<()> {
    let report = search_report(query, paths, context)?;
    info!(target: "runtime", matches = report.match_count(), files = report.files.len(), "search_done");
    print!("{}", render(&report));
    Ok(())
}

fn run_parse(cfg: &Config, report: &Path, json: bool) -> Result<()> {
    let text = read_text(report)?;
    let Some(snapshot) = parse_last_block(&text, cfg.path_style()) else {
        bail!("{} holds no complete results block", report.display());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }
    for (path, lines) in &snapshot {
        println!("{}:", path.display());
        for (line, text) in lines {
            println!("{:>5}: {}", line + 1, text);
        }
    }
    Ok(())
}

fn run_locate(cfg: &Config, report: &Path, offset: usize) -> Result<()> {
    let text = read_text(report)?;
    match locate(&text, offset, cfg.path_style()) {
        Some(location) => {
            println!("{location}");
            Ok(())
        }
        None => bail!("offset {offset} is not on a result row"),
    }
}

fn print_outcome(outcome: &ReplaceOutcome) {
    match outcome {
        ReplaceOutcome::NotEnabled => println!("results buffer is not active"),
        ReplaceOutcome::NoResults => println!("no complete results block"),
        ReplaceOutcome::NoChanges => println!("no changes found"),
        ReplaceOutcome::Replaced(summary) => {
            for path in &summary.applied {
                println!("changed {}", path.display());
            }
            for path in &summary.pending {
                println!("opened {}", path.display());
            }
            for path in &summary.failed {
                eprintln!("could not open {}", path.display());
            }
            println!("{} changed line(s)", summary.changed_lines);
        }
    }
}

fn log_telemetry() {
    debug!(
        target: "runtime",
        queued = EVENTS_QUEUED.load(Ordering::Relaxed),
        dispatched = EVENTS_DISPATCHED.load(Ordering::Relaxed),
        loads = LOAD_SIGNALS.load(Ordering::Relaxed),
        modifications = MODIFIED_SIGNALS.load(Ordering::Relaxed),
        "event_counters"
    );
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(args.log_stderr);
    install_panic_hook();

    let cfg = load_from(args.config.clone())?;
    let config_path = cfg.source.as_ref().map(|p| p.display().to_string());
    info!(
        target: "runtime",
        command = args.command.name(),
        config = config_path.as_deref(),
        "startup"
    );

    let result = match &args.command {
        Command::Search {
            query,
            paths,
            context,
        } => run_search(query, paths, *context),
        Command::Parse { report, json } => run_parse(&cfg, report, *json),
        Command::Locate { report, offset } => run_locate(&cfg, report, *offset),
        Command::Apply {
            baseline,
            edited,
            save_and_close,
            open,
            write,
        } => {
            let request = ApplyRequest {
                baseline: read_text(baseline)?,
                edited: read_text(edited)?,
                save_and_close: save_and_close.then_some(true),
                open: open.clone(),
                write: *write,
            };
            run_apply(&cfg, &request).map(|run| {
                run.outcomes.iter().for_each(print_outcome);
                if request.write {
                    println!("wrote {} file(s)", run.written);
                }
            })
        }
    };
    log_telemetry();
    result
}
