use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use otomidi::board::Board;
use otomidi::middle::Middle;
use otomidi::output::{start_output, LogSink};
use otomidi::pipeline::generate::{generate_notes, GenerateLimit};
use otomidi::pipeline::{midi_file, otomata_url, persistence, BoardSettings};
use otomidi::shared::{ControlEvent, DEFAULT_COLS, DEFAULT_ROWS, SWEEP_INTERVAL};

/// Play otomata boards as midi notes
#[derive(Parser)]
#[command(name = "otomidi", version, about, long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a board in real time, logging the notes it sends
    Run {
        board: PathBuf,

        /// Record everything played to this .mid file
        #[arg(long)]
        record: Option<PathBuf>,

        /// Stop after this many seconds (default: until ctrl-c)
        #[arg(long)]
        seconds: Option<f64>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Run a board offline and write the notes to a midi file
    Generate {
        board: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Stop after this many board steps
        #[arg(long, conflicts_with_all = ["notes_limit", "seconds"])]
        steps: Option<u64>,

        /// Stop once this many notes were played
        #[arg(long = "note-count", conflicts_with = "seconds")]
        notes_limit: Option<usize>,

        /// Stop after this much board time (default: 60)
        #[arg(long)]
        seconds: Option<u64>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Write an empty board file
    New {
        output: PathBuf,

        #[arg(long, default_value_t = DEFAULT_ROWS)]
        rows: usize,

        #[arg(long, default_value_t = DEFAULT_COLS)]
        cols: usize,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Turn an otomata link into a board file
    ImportUrl { url: String, output: PathBuf },

    /// Print the otomata link for a board
    ExportUrl { board: PathBuf },

    /// Rewrite a board file in another format (picked by extension)
    Convert { input: PathBuf, output: PathBuf },
}

/// Settings that override what the board file says.
#[derive(Args)]
struct Overrides {
    /// Milliseconds between board states
    #[arg(long)]
    speed: Option<u32>,

    /// Note length in milliseconds
    #[arg(long)]
    duration: Option<u32>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=127))]
    volume: Option<u8>,

    /// Comma separated note names, e.g. "D3, A3, Bb3"
    #[arg(long)]
    notes: Option<String>,

    /// General midi program
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=127))]
    instrument: Option<u8>,
}

impl Overrides {
    fn apply(&self, settings: &mut BoardSettings) {
        if let Some(speed) = self.speed {
            settings.speed_ms = speed;
        }
        if let Some(duration) = self.duration {
            settings.note_duration_ms = duration;
        }
        if let Some(volume) = self.volume {
            settings.volume = volume;
        }
        if let Some(notes) = &self.notes {
            settings.set_notes(notes);
        }
        if let Some(instrument) = self.instrument {
            settings.instrument = instrument;
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run { board, record, seconds, overrides } => {
            let mut settings = load(&board)?;
            overrides.apply(&mut settings);
            play(settings, record.as_deref(), seconds.map(Duration::from_secs_f64))
        }
        Commands::Generate { board, output, steps, notes_limit, seconds, overrides } => {
            let mut settings = load(&board)?;
            overrides.apply(&mut settings);
            let limit = match (steps, notes_limit, seconds) {
                (Some(n), _, _) => GenerateLimit::Steps(n),
                (_, Some(n), _) => GenerateLimit::Notes(n),
                (_, _, secs) => GenerateLimit::Duration(secs.unwrap_or(60) * 1000),
            };
            let generated = generate_notes(&settings, limit, Instant::now());
            if generated.notes.is_empty() {
                anyhow::bail!("board played no notes in {} steps", generated.steps);
            }
            midi_file::write_midi_file(&output, settings.instrument, &generated.notes)
                .with_context(|| format!("writing {}", output.display()))?;
            tracing::info!(
                steps = generated.steps,
                notes = generated.notes.len(),
                stalled = generated.stalled,
                "generated {}",
                output.display()
            );
            Ok(())
        }
        Commands::New { output, rows, cols, overrides } => {
            if rows == 0 || cols == 0 {
                anyhow::bail!("a board needs at least one row and one column");
            }
            let mut settings = BoardSettings::with_board(Board::new(rows, cols));
            overrides.apply(&mut settings);
            save(&output, &settings)
        }
        Commands::ImportUrl { url, output } => {
            let settings = otomata_url::import_url(&url).context("unable to parse otomata url")?;
            save(&output, &settings)
        }
        Commands::ExportUrl { board } => {
            let settings = load(&board)?;
            println!("{}", otomata_url::export_url(&settings));
            Ok(())
        }
        Commands::Convert { input, output } => save(&output, &load(&input)?),
    }
}

fn load(path: &Path) -> anyhow::Result<BoardSettings> {
    persistence::load_board_file(path).with_context(|| format!("loading {}", path.display()))
}

fn save(path: &Path, settings: &BoardSettings) -> anyhow::Result<()> {
    persistence::save_board_file(path, settings)
        .with_context(|| format!("saving {}", path.display()))?;
    tracing::info!("saved {}", path.display());
    Ok(())
}

fn play(settings: BoardSettings, record: Option<&Path>, limit: Option<Duration>) -> anyhow::Result<()> {
    let instrument = settings.instrument;
    if settings.use_samples {
        tracing::warn!(sample = %settings.sample, "sample playback not available, sending midi notes");
    }
    let mut middle = Middle::new(settings);
    let output = start_output(Box::new(LogSink::new()))?;
    output.send_all(middle.init_commands());

    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .context("failed to set ctrl-c handler")?;

    if record.is_some() {
        middle.handle_event(ControlEvent::StartRecording);
    }
    middle.handle_event(ControlEvent::TogglePlay);

    let started = Instant::now();
    let ticker = crossbeam_channel::tick(SWEEP_INTERVAL);
    let mut last_tick = started;

    loop {
        crossbeam_channel::select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> msg => {
                let Ok(now) = msg else { break };
                let elapsed = now.saturating_duration_since(last_tick);
                last_tick = now;
                output.send_all(middle.tick(elapsed, now));
                output.send_all(middle.sweep(now));
                if limit.is_some_and(|l| now.saturating_duration_since(started) >= l) {
                    break;
                }
            }
        }
    }

    middle.handle_event(ControlEvent::TogglePlay);
    output.send_all(middle.release_all());
    tracing::info!(steps = middle.snapshot().steps, "stopped");

    if let Some(path) = record {
        middle.handle_event(ControlEvent::StopRecording);
        if let Some(recording) = middle.take_recording() {
            midi_file::write_midi_file(path, instrument, recording.notes())
                .with_context(|| format!("writing {}", path.display()))?;
        }
    }
    drop(output); // flush the last note-offs
    Ok(())
}
