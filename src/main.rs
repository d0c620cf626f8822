//! pubsub-frame - Developer tool untuk wire codec
//!
//! Usage:
//!   pubsub-frame encode --type publish --topic news --body hello
//!   pubsub-frame decode "93 04 c4 04 6e657773 c4 05 68656c6c6f"
//!   pubsub-frame bench --iterations 1000000 --payload-size 64
//!
//! Log level lewat `-v` atau `RUST_LOG`.

use std::hint::black_box;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pubsub_wire::protocol::{Decoder, Encoder, Limits, Message, MessageRef, MessageType};

#[derive(Parser)]
#[command(name = "pubsub-frame")]
#[command(about = "Encode, decode and benchmark pub/sub wire frames", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose output (debug logs)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode satu pesan dan print frame sebagai hex
    Encode {
        /// Message type: keep-alive, authenticate, subscribe, unsubscribe, publish, atau tag numerik
        #[arg(short = 't', long = "type")]
        msg_type: MessageType,
        /// Topic (credential untuk authenticate)
        #[arg(long, default_value = "")]
        topic: String,
        /// Body / payload
        #[arg(short, long, default_value = "")]
        body: String,
    },
    /// Decode semua frame dari input hex (whitespace diabaikan)
    Decode {
        hex: String,
        /// Tolak topic lebih panjang dari ini
        #[arg(long)]
        max_topic_len: Option<usize>,
        /// Tolak body lebih panjang dari ini
        #[arg(long)]
        max_body_len: Option<usize>,
    },
    /// Benchmark encode/decode
    Bench {
        #[arg(short, long, default_value = "1000000")]
        iterations: usize,
        #[arg(short, long, default_value = "64")]
        payload_size: usize,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_encode(msg_type: MessageType, topic: String, body: String) -> Result<()> {
    if !msg_type.is_known() {
        info!(tag = msg_type.tag(), "encoding unknown message type as raw tag");
    }

    let msg = Message::new(msg_type, topic, body);
    let frame = msg.to_bytes().context("failed to encode message")?;
    debug!(msg_type = %msg.msg_type, frame_len = frame.len(), "encoded frame");

    println!("{}", hex::encode(&frame));
    Ok(())
}

fn run_decode(input: &str, limits: Limits) -> Result<()> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(&cleaned).context("input is not valid hex")?;

    let mut decoder = Decoder::with_limits(&bytes, limits);
    let mut count = 0usize;

    for result in decoder.by_ref() {
        let msg = result.with_context(|| format!("frame {} is malformed", count))?;
        print_message(count, &msg);
        count += 1;
    }

    if count == 0 {
        bail!("no frames in input");
    }

    debug!(frames = count, bytes = decoder.consumed(), "decode complete");
    Ok(())
}

fn print_message(index: usize, msg: &MessageRef<'_>) {
    if msg.msg_type.is_keep_alive() {
        println!("[{}] {}", index, msg.msg_type);
        return;
    }

    let warning = if msg.msg_type.is_known() { "" } else { " ⚠️ unknown tag" };
    println!(
        "[{}] {}{} topic=\"{}\" body=\"{}\" ({} bytes)",
        index,
        msg.msg_type,
        warning,
        msg.topic.escape_ascii(),
        msg.body.escape_ascii(),
        msg.body.len()
    );
}

fn run_bench(iterations: usize, payload_size: usize) -> Result<()> {
    if iterations == 0 {
        bail!("--iterations must be greater than zero");
    }

    println!("📊 Codec Benchmark (MessagePack frames)");
    println!("---------------------------------------");

    let mut encoder = Encoder::new(1024 * 1024); // 1MB buffer
    let payload = vec![0u8; payload_size];
    let msg = MessageRef::new(MessageType::Publish, b"bench.topic", &payload);
    let frame_len = pubsub_wire::protocol::encoded_len(msg);

    // Benchmark encode
    let start = Instant::now();
    for _ in 0..iterations {
        if encoder.capacity() - encoder.len() < frame_len {
            encoder.reset();
        }
        black_box(encoder.encode(msg)?);
    }
    let encode_duration = start.elapsed();

    // Prepare buffer untuk decode benchmark
    const DECODE_FRAMES: usize = 10_000;
    encoder.reset();
    for _ in 0..DECODE_FRAMES {
        encoder.encode(msg)?;
    }
    let encoded_data = encoder.as_bytes().to_vec();

    // Benchmark decode
    let rounds = (iterations / DECODE_FRAMES).max(1);
    let start = Instant::now();
    for _ in 0..rounds {
        for frame in Decoder::new(&encoded_data) {
            black_box(frame?);
        }
    }
    let decode_duration = start.elapsed();

    // Benchmark keep-alive
    let start = Instant::now();
    for _ in 0..iterations {
        if encoder.capacity() - encoder.len() < 1 {
            encoder.reset();
        }
        black_box(encoder.encode(MessageRef::keep_alive())?);
    }
    let keep_alive_duration = start.elapsed();

    let decoded = rounds * DECODE_FRAMES;
    let encode_ns = encode_duration.as_nanos() as f64 / iterations as f64;
    let decode_ns = decode_duration.as_nanos() as f64 / decoded as f64;
    let keep_alive_ns = keep_alive_duration.as_nanos() as f64 / iterations as f64;

    println!("  Payload size: {} bytes (frame {} bytes)", payload_size, frame_len);
    println!("  Encode ops: {}", iterations);
    println!(
        "  Encode latency: {:.2} ns/op ({:.3} μs/op)",
        encode_ns,
        encode_ns / 1000.0
    );
    println!(
        "  Decode latency: {:.2} ns/op ({:.3} μs/op)",
        decode_ns,
        decode_ns / 1000.0
    );
    println!("  Keep-alive encode: {:.2} ns/op (1 byte)", keep_alive_ns);
    println!(
        "  Encode throughput: {:.2} M msgs/sec",
        iterations as f64 / encode_duration.as_secs_f64() / 1_000_000.0
    );
    println!(
        "  Decode throughput: {:.2} MB/sec",
        (decoded * frame_len) as f64 / decode_duration.as_secs_f64() / 1_000_000.0
    );

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Encode {
            msg_type,
            topic,
            body,
        } => run_encode(msg_type, topic, body),
        Commands::Decode {
            hex,
            max_topic_len,
            max_body_len,
        } => {
            let mut limits = Limits::default();
            if let Some(max) = max_topic_len {
                limits = limits.with_max_topic_len(max);
            }
            if let Some(max) = max_body_len {
                limits = limits.with_max_body_len(max);
            }
            run_decode(&hex, limits)
        }
        Commands::Bench {
            iterations,
            payload_size,
        } => run_bench(iterations, payload_size),
    }
}
