//! Stario demo
//!
//! 1. Throughput run: producer thread mendorong N byte lewat `pipe(capacity)`,
//!    consumer membaca dan membandingkan checksum
//! 2. `--interactive`: jalankan setiap prompt di terminal
//!
//! Usage:
//!   cargo run --release -- [--capacity N] [--bytes N] [--interactive] [--verbose]

use std::io::{self, Read, Write};
use std::thread;
use std::time::Instant;

use log::{error, info};
use stario::{pipe, Result};

/// Demo configuration
struct DemoConfig {
    capacity: usize,
    bytes: usize,
    interactive: bool,
    verbose: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            capacity: 4096,
            bytes: 64 * 1024 * 1024,
            interactive: false,
            verbose: false,
        }
    }
}

fn checksum(acc: u64, data: &[u8]) -> u64 {
    data.iter()
        .fold(acc, |sum, &b| sum.wrapping_mul(31).wrapping_add(b as u64))
}

fn run_throughput(config: &DemoConfig) -> Result<()> {
    println!("📊 Byte Channel Throughput");
    println!("--------------------------");

    let (mut writer, mut reader) = pipe(config.capacity)?;
    let total = config.bytes;

    let start = Instant::now();

    let producer = thread::spawn(move || -> io::Result<u64> {
        let mut chunk = [0u8; 512];
        let mut sent = 0usize;
        let mut sum = 0u64;
        while sent < total {
            let n = chunk.len().min(total - sent);
            for (i, b) in chunk[..n].iter_mut().enumerate() {
                *b = ((sent + i) % 251) as u8;
            }
            writer.write_all(&chunk[..n])?;
            sum = checksum(sum, &chunk[..n]);
            sent += n;
        }
        // drop(writer) -> finish
        Ok(sum)
    });

    let mut buf = [0u8; 512];
    let mut received = 0usize;
    let mut sum = 0u64;
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                sum = checksum(sum, &buf[..n]);
                received += n;
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::yield_now(),
            Err(e) => return Err(e.into()),
        }
    }

    let duration = start.elapsed();
    let sent_sum = producer
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;

    println!("  Capacity:   {} bytes ({} usable)", config.capacity, config.capacity - 1);
    println!("  Transferred: {} bytes in {:.3}s", received, duration.as_secs_f64());
    println!(
        "  Throughput: {:.2} MB/sec",
        received as f64 / duration.as_secs_f64() / 1_000_000.0
    );

    if received == total && sum == sent_sum {
        println!("  ✅ FIFO intact (checksum {:016x})\n", sum);
    } else {
        println!("  ⚠️  MISMATCH: sent {} / received {}\n", total, received);
    }

    Ok(())
}

fn run_interactive() -> Result<()> {
    println!("🎛  Interactive prompts (Ctrl-D ends a prompt)");
    println!("---------------------------------------------");

    let name = stario::line("Name: ", "guest");
    println!("  line        -> {:?}", name.string());

    let secret = stario::password("Password: ", "");
    println!("  password    -> {} chars", secret.string_or_default().chars().count());

    let pin = stario::password_with_mask("PIN: ", "0000", "*");
    println!("  masked      -> int {:?}", pin.int());

    let note = stario::message_box("Note (cooked): ", "none");
    println!("  message_box -> {:?}", note.string());

    let agreed = stario::yes_no("Continue? [Y/n] ", true)?;
    println!("  yes_no      -> {}", agreed);

    stario::wait_until("Type 'ok' to finish: ", "ok", true)?;
    println!();
    io::stdout().flush()?;

    Ok(())
}

fn print_usage() {
    println!("Usage: stario [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --capacity <N>   Ring capacity in bytes (default: 4096)");
    println!("  -n, --bytes <N>      Bytes to push through the ring (default: 67108864)");
    println!("  -i, --interactive    Run the prompt demo afterwards");
    println!("  -v, --verbose        Debug logging");
    println!("  -h, --help           Print help");
}

fn parse_args() -> Option<DemoConfig> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = DemoConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--capacity" | "-c" => {
                if i + 1 < args.len() {
                    config.capacity = args[i + 1].parse().unwrap_or(config.capacity);
                    i += 1;
                }
            }
            "--bytes" | "-n" => {
                if i + 1 < args.len() {
                    config.bytes = args[i + 1].parse().unwrap_or(config.bytes);
                    i += 1;
                }
            }
            "--interactive" | "-i" => config.interactive = true,
            "--verbose" | "-v" => config.verbose = true,
            _ => {
                print_usage();
                return None;
            }
        }
        i += 1;
    }

    Some(config)
}

fn main() {
    let Some(config) = parse_args() else {
        return;
    };

    let default_level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    info!("stario demo: capacity={} bytes={}", config.capacity, config.bytes);

    if let Err(e) = run_throughput(&config) {
        error!("throughput run failed: {}", e);
        std::process::exit(1);
    }

    if config.interactive {
        if let Err(e) = run_interactive() {
            error!("prompt demo ended: {}", e);
        }
    }
}
