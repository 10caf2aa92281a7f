//! Thin command-line front-end (spec.md §1(b)): scan, connect, issue one
//! operation, print the result. Deliberately out of scope for the protocol
//! engine itself; grounded on `sirius-dive`'s `main.rs` (`clap::Parser` /
//! `Subcommand` shape, one-shot-connection-per-invocation style). Preference
//! storage for the last-connected device is not implemented — this always
//! scans fresh, matching that same example's behavior.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::info;

use viiiiva_protocol::directory::LogicalDirectoryEntry;
use viiiiva_protocol::interface::{ErrorKind, ResultSink};
use viiiiva_protocol::manager::ProtocolManager;
use viiiiva_protocol::transport::ble::{self, BleTransport};

#[derive(Parser)]
#[command(name = "viiiiva")]
#[command(about = "Talk to a Viiiiva heart-rate monitor over Bluetooth LE")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Scan duration in seconds.
    #[arg(long, default_value = "5", global = true)]
    scan_timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// List the files on the device.
    List,
    /// Download one file by its directory index.
    Download {
        /// 16-bit directory index, e.g. 0x1234 or 4660.
        #[arg(value_parser = parse_index)]
        index: u16,
        /// Output path. Defaults to the synthetic `{index:04x}.fit` name.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Erase one file by its directory index.
    Erase {
        #[arg(value_parser = parse_index)]
        index: u16,
    },
    /// Set the device's clock to the current time.
    SetClock,
}

fn parse_index(s: &str) -> Result<u16, std::num::ParseIntError> {
    if let Some(hex) = s.strip_prefix("0x") {
        u16::from_str_radix(hex, 16)
    } else {
        s.parse()
    }
}

fn synthetic_filename(index: u16) -> String {
    format!("{index:04x}.fit")
}

fn format_posix(posix_time: i64) -> String {
    chrono::DateTime::from_timestamp(posix_time, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| format!("<invalid timestamp {posix_time}>"))
}

/// Collects engine events for the CLI, printing as it goes; the driving
/// loop watches `ProtocolManager::is_waiting` rather than any state here.
/// Holds the one piece of state a caller needs back after the loop — the
/// bytes of a completed download — as an owned field rather than a
/// thread-local, since `ProtocolManager` (and this sink) may resume on a
/// different Tokio worker thread after each `.await` in the driving loop.
#[derive(Default)]
struct CliSink {
    downloaded: Option<(u16, Vec<u8>)>,
}

impl ResultSink for CliSink {
    fn on_error(&mut self, code: ErrorKind, message: &str) {
        eprintln!("error: {code:?}: {message}");
    }

    fn on_parse_clock(&mut self, posix_time: i64) {
        println!("device clock: {}", format_posix(posix_time));
    }

    fn on_parse_directory_entry(&mut self, entry: LogicalDirectoryEntry) {
        println!(
            "{}  {:>10} bytes  {}",
            synthetic_filename(entry.index),
            entry.length,
            format_posix(entry.posix_time)
        );
    }

    fn on_finish_parsing_directory(&mut self) {
        info!("directory listing complete");
    }

    fn on_download_file(&mut self, index: u16, bytes: Vec<u8>) {
        info!("downloaded {} bytes for index {:#06x}", bytes.len(), index);
        self.downloaded = Some((index, bytes));
    }

    fn on_erase_file(&mut self, index: u16, ok: bool) {
        println!("erase {index:#06x}: {}", if ok { "ok" } else { "failed" });
    }

    fn on_set_time(&mut self, ok: bool) {
        println!("set clock: {}", if ok { "ok" } else { "failed" });
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .ok();

    let cli = Cli::parse();

    let adapter = ble::default_adapter().await?;
    println!("scanning for a Viiiiva device...");
    let mut devices = ble::scan(&adapter, Duration::from_secs(cli.scan_timeout)).await?;
    let device = devices.pop().ok_or(ble::BleError::DeviceNotFound)?;
    println!("connecting to {}...", device.name.as_deref().unwrap_or("<unknown>"));

    let (transport, mut notifications) = BleTransport::connect(device.peripheral).await?;

    let mut manager = ProtocolManager::new(transport, CliSink::default());

    match cli.command {
        Commands::List => manager.download_directory(),
        Commands::Download { index, .. } => manager.download_file(index),
        Commands::Erase { index } => manager.erase_file(index),
        Commands::SetClock => {
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("system clock before 1970")
                .as_secs_f64();
            manager.set_time_fractional(now);
        }
    }

    let inactivity_timeout = manager.config().inactivity_timeout;
    while manager.is_waiting() {
        match tokio::time::timeout(inactivity_timeout, notifications.recv()).await {
            Ok(Some(bytes)) => manager.notify_value(&bytes),
            Ok(None) => break,
            Err(_elapsed) => manager.notify_timeout(),
        }
    }

    let (_, sink) = manager.into_parts();

    if let Commands::Download { output, .. } = &cli.command {
        if let Some((index, bytes)) = sink.downloaded {
            let path = output.clone().unwrap_or_else(|| PathBuf::from(synthetic_filename(index)));
            std::fs::write(&path, &bytes)?;
            println!("wrote {} ({} bytes)", path.display(), bytes.len());
        }
    }

    Ok(())
}
