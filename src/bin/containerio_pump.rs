//! containerio Pump Binary
//!
//! Baca stdin seolah-olah stdout container, lewatkan lewat ring buffer,
//! tulis ke stdout. Stats dicetak ke stderr.
//!
//! Backend json-file dan syslog tidak ada di crate ini: kedua driver hanya
//! disimulasikan dengan baris mentah ke stdout (bukan JSON, bukan format
//! syslog). Driver `none` membuang semua output.
//!
//! Usage:
//!   some_noisy_process | cargo run --release --bin containerio_pump -- [OPTIONS]

use std::io::{self, BufWriter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use containerio::logger::{Backend, DiscardBackend, LogDriver, WriterBackend};
use containerio::{LogPump, StatsSnapshot, StreamKind};

/// Pump configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "containerio_pump", version, about = "Pump stdin through a log ring buffer")]
struct PumpConfig {
    /// Jumlah slot ring buffer
    #[arg(short, long, default_value_t = 1024)]
    capacity: usize,

    /// Log driver: none, json-file, syslog (json-file/syslog ditulis
    /// sebagai baris mentah ke stdout)
    #[arg(short, long, default_value = "json-file")]
    driver: String,

    /// Interval cetak stats dalam detik (0 = hanya ringkasan akhir)
    #[arg(long, default_value_t = 5)]
    stats_interval: u64,

    /// Verbose output (debug level)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_stats(stats: &StatsSnapshot, uptime: Duration) {
    let rate = stats.records_pushed as f64 / uptime.as_secs_f64().max(f64::EPSILON);

    eprintln!("\n📊 Pump Stats (uptime: {:.1}s)", uptime.as_secs_f64());
    eprintln!("   Records IN:    {} ({:.1}/sec)", stats.records_pushed, rate);
    eprintln!("   Records OUT:   {}", stats.records_written);
    eprintln!("   Bytes out:     {} KB", stats.bytes_written / 1024);
    if stats.records_lost() > 0 {
        eprintln!(
            "   Dropped:       {} ({:.2}% lost) ⚠️",
            stats.records_dropped,
            stats.drop_rate()
        );
    }
    if stats.records_rejected > 0 {
        eprintln!("   Rejected:      {} (after close) ⚠️", stats.records_rejected);
    }
    if stats.write_errors > 0 {
        eprintln!("   Write errors:  {} ⚠️", stats.write_errors);
    }
}

/// Semua driver selain `none` menulis baris mentah ke stdout
fn backend_for(driver: LogDriver) -> Box<dyn Backend> {
    match driver {
        LogDriver::None => Box::new(DiscardBackend),
        LogDriver::JsonFile | LogDriver::Syslog => Box::new(WriterBackend::new(
            driver.as_str(),
            BufWriter::new(io::stdout()),
        )),
    }
}

fn run(config: PumpConfig) -> Result<()> {
    let driver = LogDriver::parse_or_none(&config.driver);
    info!(capacity = config.capacity, %driver, "starting pump");

    let pump = LogPump::start(config.capacity, backend_for(driver))
        .context("failed to start log pump")?;
    let start_time = Instant::now();

    // Reporter stats periodik, berhenti saat stdin EOF
    let done = Arc::new(AtomicBool::new(false));
    let reporter = if config.stats_interval > 0 {
        let done = Arc::clone(&done);
        let interval = Duration::from_secs(config.stats_interval);
        let producer = pump.producer();
        Some(thread::spawn(move || {
            let mut last_print = Instant::now();
            while !done.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(100));
                if last_print.elapsed() >= interval {
                    print_stats(&producer.stats(), start_time.elapsed());
                    last_print = Instant::now();
                }
            }
        }))
    } else {
        None
    };

    let stdin = io::stdin();
    let lines = pump
        .copy_from(StreamKind::Stdout, stdin.lock())
        .context("failed to read stdin")?;

    done.store(true, Ordering::Relaxed);
    if let Some(handle) = reporter {
        if handle.join().is_err() {
            warn!("stats reporter thread panicked");
        }
    }

    let stats = pump.shutdown().context("failed to shut down log pump")?;
    info!(lines, "stdin closed");
    print_stats(&stats, start_time.elapsed());

    Ok(())
}

fn main() {
    let config = PumpConfig::parse();
    init_tracing(config.verbose);

    if let Err(e) = run(config) {
        eprintln!("❌ Pump error: {:#}", e);
        std::process::exit(1);
    }
}
