//! Standalone bingo room server binary
//!
//! Usage: cargo run -p bingo_web --bin bingo-web-server

use bingo_engine::catalog::BoardCatalog;
use bingo_web::room::RoomConfig;
use bingo_web::{ServerConfig, WebServer};
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    bingo_web::init_logging();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut host = "127.0.0.1".to_string();
    let mut port = 8080u16;
    let mut boards: Option<PathBuf> = None;
    let mut room = RoomConfig::default();
    let mut origins: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--host" | "-h" => {
                host = take_value(&args, i, "--host");
                i += 2;
            }
            "--port" | "-p" => {
                port = take_value(&args, i, "--port").parse().unwrap_or_else(|_| {
                    eprintln!("Error: invalid port number");
                    std::process::exit(1);
                });
                i += 2;
            }
            "--boards" | "-b" => {
                boards = Some(PathBuf::from(take_value(&args, i, "--boards")));
                i += 2;
            }
            "--countdown" => {
                room.countdown_secs = take_value(&args, i, "--countdown")
                    .parse()
                    .unwrap_or_else(|_| {
                        eprintln!("Error: invalid countdown length");
                        std::process::exit(1);
                    });
                i += 2;
            }
            "--call-interval" => {
                let millis: u64 = take_value(&args, i, "--call-interval")
                    .parse()
                    .unwrap_or_else(|_| {
                        eprintln!("Error: invalid call interval");
                        std::process::exit(1);
                    });
                room.call_interval = Duration::from_millis(millis);
                i += 2;
            }
            "--payout-ratio" => {
                let ratio: f64 = take_value(&args, i, "--payout-ratio")
                    .parse()
                    .unwrap_or_else(|_| {
                        eprintln!("Error: invalid payout ratio");
                        std::process::exit(1);
                    });
                if !(0.0..=1.0).contains(&ratio) {
                    eprintln!("Error: payout ratio must be between 0 and 1");
                    std::process::exit(1);
                }
                room.payout_ratio = ratio;
                i += 2;
            }
            "--stake" => {
                room.default_stake = take_value(&args, i, "--stake")
                    .parse()
                    .unwrap_or_else(|_| {
                        eprintln!("Error: invalid stake");
                        std::process::exit(1);
                    });
                i += 2;
            }
            "--origin" => {
                origins.push(take_value(&args, i, "--origin"));
                i += 2;
            }
            "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // Load the board catalog
    let catalog = match boards {
        Some(path) => {
            tracing::info!("Loading board catalog from {}", path.display());
            BoardCatalog::load(&path).unwrap_or_else(|err| {
                eprintln!("Error: failed to load board catalog: {err}");
                std::process::exit(1);
            })
        }
        None => {
            tracing::warn!("No --boards file given; using the built-in sample catalog");
            BoardCatalog::sample()
        }
    };

    let config = ServerConfig::new(host, port, room).with_allowed_origins(origins);

    tracing::info!("Starting Bingo Web Server");
    tracing::info!("  Host: {}", config.host());
    tracing::info!("  Port: {}", config.port());
    tracing::info!("  Boards: {}", catalog.len());
    tracing::info!("  Countdown: {}s", config.room().countdown_secs);
    tracing::info!("  Call interval: {:?}", config.room().call_interval);

    // Create and start server
    let server = WebServer::new(config, catalog);
    let handle = server.start().await?;

    tracing::info!("Server running at http://{}", handle.address());
    println!("\n✅ Server running at http://{}", handle.address());
    println!("   Press Ctrl+C to stop\n");

    // Wait for Ctrl+C
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down server");
    println!("\n🛑 Shutting down...");
    handle.shutdown().await?;
    tracing::info!("Server stopped cleanly");
    println!("✅ Server stopped cleanly\n");

    Ok(())
}

fn take_value(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i + 1) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {flag} requires a value");
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!("Bingo Web Server");
    println!();
    println!("Usage: bingo-web-server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --host, -h <HOST>           Host to bind to (default: 127.0.0.1)");
    println!("  --port, -p <PORT>           Port to bind to (default: 8080)");
    println!("  --boards, -b <FILE>         Board catalog JSON file");
    println!("  --countdown <SECS>          Lobby countdown length (default: 60)");
    println!("  --call-interval <MS>        Pause between number calls (default: 3000)");
    println!("  --payout-ratio <RATIO>      Winner share of stakes, 0-1 (default: 0.8)");
    println!("  --stake <AMOUNT>            Opening per-player stake (default: 10)");
    println!("  --origin <ORIGIN>           Allowed CORS origin (repeatable; default: any)");
    println!("  --help                      Show this help message");
}
