use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use padplay::config::{Customization, default_config_path};
use padplay::midi::device::MidiDeviceManager;
use padplay::midi::output::MidiOutputPlayer;
use padplay::{
    ExportFormat, NotePlayer, Session, SessionCommand, TouchBatch, create_notification_channel,
    drain_notifications, note_name,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "padplay", about = "Play a note grid from touch input over MIDI")]
struct Cli {
    /// Customization document (JSON, or RON with a .ron extension)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List MIDI output ports
    Ports,
    /// Print every note the configured grid can play
    Notes,
    /// Feed a scripted touch sequence through the tracker
    Play {
        /// JSON list of touch batches, each with an optional `delay_ms`
        #[arg(long)]
        script: PathBuf,
        /// MIDI output port name (first port when omitted)
        #[arg(long)]
        port: Option<String>,
        /// Print note commands instead of sending them
        #[arg(long)]
        dry_run: bool,
        /// Record the performance and export it here (.wav or .json)
        #[arg(long)]
        record: Option<PathBuf>,
    },
}

#[derive(Debug, Deserialize)]
struct ScriptStep {
    #[serde(default)]
    delay_ms: u64,
    #[serde(flatten)]
    batch: TouchBatch<u64>,
}

/// Dry-run player: prints each command
struct ConsolePlayer;

impl NotePlayer for ConsolePlayer {
    fn play_note(&mut self, note: u8, velocity: u8) {
        println!("note on  {:>4} ({}) velocity {}", note_name(note), note, velocity);
    }

    fn stop_note(&mut self, note: u8) {
        println!("note off {:>4} ({})", note_name(note), note);
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Customization> {
    let path = match path {
        Some(path) => path,
        None => default_config_path()?,
    };
    Customization::load_or_default(&path)
        .with_context(|| format!("loading customization from {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Command::Ports => {
            let ports = MidiDeviceManager::new().list_output_ports();
            if ports.is_empty() {
                println!("No MIDI output port detected.");
            }
            for port in ports {
                let marker = if port.is_default { " (default)" } else { "" };
                println!("  [{}] {}{}", port.id, port.name, marker);
            }
        }
        Command::Notes => {
            let grid = config.to_grid()?;
            for row in 0..grid.rows() {
                let names: Vec<String> = (0..grid.columns())
                    .filter_map(|column| grid.note_for(row, column))
                    .map(note_name)
                    .collect();
                println!("row {}: {}", row, names.join(" "));
            }
        }
        Command::Play {
            script,
            port,
            dry_run,
            record,
        } => {
            let text = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let steps: Vec<ScriptStep> = serde_json::from_str(&text)
                .with_context(|| format!("parsing script {}", script.display()))?;

            let instrument = config.instrument()?;
            let player: Box<dyn NotePlayer> = if dry_run {
                Box::new(ConsolePlayer)
            } else {
                let mut output = MidiOutputPlayer::connect(port.as_deref())?;
                output.select_instrument(instrument);
                println!("Playing {} on {}", instrument, output.port_name());
                Box::new(output)
            };

            let scratch_dir = std::env::temp_dir().join("padplay");
            let (notify_tx, mut notify_rx) = create_notification_channel(32);
            let mut session: Session<u64, Box<dyn NotePlayer>> =
                Session::from_config(&config, player, &scratch_dir)?.with_notifications(notify_tx);

            if record.is_some() {
                session.apply(SessionCommand::ToggleRecording)?;
            }

            for step in &steps {
                if step.delay_ms > 0 {
                    std::thread::sleep(Duration::from_millis(step.delay_ms));
                }
                let snapshot = session.handle_touches(&step.batch);
                let sounding: Vec<String> = snapshot.notes.iter().map(|&n| note_name(n)).collect();
                log::info!("sounding: [{}]", sounding.join(", "));
            }
            session.apply(SessionCommand::ReleaseAll)?;

            if let Some(dest) = record {
                session.apply(SessionCommand::ToggleRecording)?;
                let format = ExportFormat::from_path(&dest);
                session.export_recording(&dest, format)?;
            }

            for notification in drain_notifications(&mut notify_rx) {
                println!("{}", notification);
            }
        }
    }

    Ok(())
}
