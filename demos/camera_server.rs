//! MJPEG streaming server example fed from stdin
//!
//! Run with: cargo run --example camera_server [BIND_ADDR]
//!
//! Pipe any MJPEG byte stream into stdin, for example:
//!
//!   ffmpeg -f lavfi -i testsrc=size=640x480:rate=24 -f mjpeg - \
//!       | cargo run --example camera_server
//!
//! or from a V4L2 camera:
//!
//!   ffmpeg -f v4l2 -input_format mjpeg -i /dev/video0 -c copy -f mjpeg - \
//!       | cargo run --example camera_server
//!
//! Then open http://localhost:8000/stream.html in a browser, or point a
//! player straight at the stream:
//!
//!   ffplay http://localhost:8000/stream.mjpg

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncReadExt;

use mjpeg_rs::{FrameBuffer, ServerConfig, StreamServer};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:8000
/// - "localhost:8080" -> 127.0.0.1:8080
/// - "127.0.0.1" -> 127.0.0.1:8000
/// - "0.0.0.0:8080" -> 0.0.0.0:8080
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 8000;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: camera_server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:8000)");
    eprintln!();
    eprintln!("Feed an MJPEG byte stream into stdin:");
    eprintln!("  ffmpeg -f lavfi -i testsrc=size=640x480:rate=24 -f mjpeg - | camera_server");
}

/// Split a byte run so every JPEG SOI marker starts its own piece
fn split_at_soi(data: &[u8]) -> Vec<&[u8]> {
    let mut cuts = Vec::new();
    let mut i = 1;
    while i + 1 < data.len() {
        if data[i] == 0xFF && data[i + 1] == 0xD8 {
            cuts.push(i);
            i += 2;
        } else {
            i += 1;
        }
    }

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        pieces.push(&data[start..cut]);
        start = cut;
    }
    if start < data.len() {
        pieces.push(&data[start..]);
    }
    pieces
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => "0.0.0.0:8000".parse().unwrap(),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mjpeg_rs=debug".parse()?)
                .add_directive("camera_server=debug".parse()?),
        )
        .init();

    let config = ServerConfig {
        bind_addr,
        ..ServerConfig::default()
    };

    println!("Starting MJPEG server on {}", config.bind_addr);
    println!();
    println!("=== Watch the stream ===");
    println!("Browser: http://localhost:{}/stream.html", bind_addr.port());
    println!("ffplay:  ffplay http://localhost:{}/stream.mjpg", bind_addr.port());
    println!();

    let mut buffer = FrameBuffer::new();
    let server = Arc::new(StreamServer::new(config, buffer.source()));

    // Producer: read encoder output from stdin and append it chunk by chunk.
    // A pipe chunks bytes arbitrarily, while append() expects each new frame
    // to start at the head of a chunk, so split reads at SOI markers first.
    let producer = tokio::spawn(async move {
        let mut stdin = tokio::io::stdin();
        let mut chunk = vec![0u8; 16 * 1024];
        // A 0xFF at the end of a read could be half a marker; hold it back
        let mut carry_ff = false;

        loop {
            match stdin.read(&mut chunk).await {
                Ok(0) => {
                    tracing::info!(
                        frames = buffer.published(),
                        "Encoder input ended"
                    );
                    break;
                }
                Ok(n) => {
                    let mut data = Vec::with_capacity(n + 1);
                    if carry_ff {
                        data.push(0xFF);
                        carry_ff = false;
                    }
                    data.extend_from_slice(&chunk[..n]);
                    if data.last() == Some(&0xFF) {
                        data.pop();
                        carry_ff = true;
                    }
                    for piece in split_at_soi(&data) {
                        buffer.append(piece);
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read encoder input");
                    break;
                }
            }
        }
        // Dropping the buffer here closes the hub; every connected session
        // observes the closure and finishes.
    });

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
        _ = producer => {
            println!("Input stream ended, shutting down...");
        }
    }

    Ok(())
}
