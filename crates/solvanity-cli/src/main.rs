//! SolVanity CLI
//!
//! Solana vanity address generator.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use solvanity_core::{
    analyze, search_space, DifficultyReport, KeyMaterial, PatternPosition, PerformanceProfile,
    SearchConfig, SearchController, SearchOutcome, SearchResult, SearchUpdate, VanityPattern,
    VanitySearch,
};
use solvanity_crypto::{base58_decode, hex};
use solvanity_pattern::{estimate_time, format_count, format_duration};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Practically unreachable: ten leading 'z' symbols
const BENCHMARK_PATTERN: &str = "zzzzzzzzzz";

#[derive(Parser)]
#[command(name = "solvanity")]
#[command(author = "SolVanity Team")]
#[command(version = "0.1.0")]
#[command(about = "Solana vanity address generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a vanity address
    Generate {
        /// Characters the address should start or end with
        #[arg(short, long)]
        pattern: String,

        /// Where the characters must appear
        #[arg(short = 't', long, default_value = "prefix")]
        position: PositionArg,

        /// Performance profile (overrides the config file)
        #[arg(long)]
        profile: Option<ProfileArg>,

        /// Worker count override, clamped to what the host can spare
        #[arg(long)]
        workers: Option<usize>,

        /// JSON search configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Read pause / resume / cancel commands from stdin
        #[arg(long)]
        interactive: bool,

        /// Save the found keypair as JSON (a directory gets solana-vanity-<address>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Estimate difficulty without searching
    Analyze {
        /// Pattern to analyze
        #[arg(short, long)]
        pattern: String,

        #[arg(short = 't', long, default_value = "prefix")]
        position: PositionArg,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that a secret key belongs to an address
    Verify {
        /// Base58 address
        #[arg(long)]
        address: String,

        /// Secret key as a JSON byte array or base58 string (32 or 64 bytes)
        #[arg(long)]
        secret: String,
    },

    /// Run benchmark
    Benchmark {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,

        #[arg(long, default_value = "performance")]
        profile: ProfileArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PositionArg {
    Prefix,
    Suffix,
}

impl From<PositionArg> for PatternPosition {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::Prefix => PatternPosition::Prefix,
            PositionArg::Suffix => PatternPosition::Suffix,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    Eco,
    Balanced,
    Performance,
}

impl From<ProfileArg> for PerformanceProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Eco => PerformanceProfile::Eco,
            ProfileArg::Balanced => PerformanceProfile::Balanced,
            ProfileArg::Performance => PerformanceProfile::Performance,
        }
    }
}

/// Key file written by `generate --output`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyFile<'a> {
    public_key: &'a str,
    /// 64-number array, importable by Solana wallets
    secret_key: &'a KeyMaterial,
    secret_key_hex: String,
    generated_at: DateTime<Utc>,
    attempts: u64,
    /// Milliseconds of unpaused search
    duration: u64,
}

impl<'a> KeyFile<'a> {
    fn new(result: &'a SearchResult, generated_at: DateTime<Utc>) -> Self {
        Self {
            public_key: &result.public_key,
            secret_key: &result.keypair,
            secret_key_hex: hex::encode(result.keypair.secret_key()),
            generated_at,
            attempts: result.total_attempts,
            duration: result.duration_ms,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Analysis<'a> {
    pattern: &'a str,
    position: PatternPosition,
    length: usize,
    #[serde(flatten)]
    report: &'a DifficultyReport,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for results
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            pattern,
            position,
            profile,
            workers,
            config,
            json,
            interactive,
            output,
        } => {
            let config = load_config(config.as_deref(), profile.map(Into::into), workers)?;
            cmd_generate(&pattern, position.into(), &config, json, interactive, output.as_deref())?;
        }
        Commands::Analyze {
            pattern,
            position,
            json,
        } => {
            cmd_analyze(&pattern, position.into(), json)?;
        }
        Commands::Verify { address, secret } => {
            cmd_verify(&address, &secret)?;
        }
        Commands::Benchmark { duration, profile } => {
            cmd_benchmark(duration, profile.into())?;
        }
    }

    Ok(())
}

/// `RUST_LOG` directives when present and valid, `info` otherwise
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn load_config(
    path: Option<&Path>,
    profile: Option<PerformanceProfile>,
    workers: Option<usize>,
) -> Result<SearchConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            SearchConfig::from_json(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => SearchConfig::default(),
    };

    if let Some(profile) = profile {
        config.profile = profile;
    }
    if workers.is_some() {
        config.workers = workers;
    }
    Ok(config)
}

fn cmd_generate(
    characters: &str,
    position: PatternPosition,
    config: &SearchConfig,
    json_output: bool,
    interactive: bool,
    output: Option<&Path>,
) -> Result<()> {
    let length = characters.chars().count();
    let report = analyze(characters, position, length);

    if !json_output {
        eprintln!("SolVanity v0.1.0");
        eprintln!("Pattern: {} ({})", characters, position);
        eprintln!("Profile: {}", config.profile);
        eprintln!();
        print_report(&mut std::io::stderr(), &report)?;
        eprintln!();
    }

    let pattern = VanityPattern::new(characters, position).context("Pattern rejected")?;
    let search = VanitySearch::start(pattern, config)?;
    let space = search_space(length);

    if !json_output {
        eprintln!("Workers: {}", search.worker_count());
        eprintln!();
    }

    let controller = search.controller();
    let ctrl_c = controller.clone();
    ctrlc::set_handler(move || {
        ctrl_c.cancel();
    })
    .context("Failed to install Ctrl-C handler")?;

    if interactive {
        spawn_stdin_controls(controller)?;
        if !json_output {
            eprintln!("Type 'pause', 'resume' or 'cancel' and press enter.");
        }
    }

    let outcome = search.run(|update| {
        if json_output {
            match serde_json::to_string(update) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Could not serialize update: {}", e),
            }
            return;
        }

        match update {
            SearchUpdate::Progress(progress) => {
                eprint!("\r{}", progress.format(space));
                let _ = std::io::stderr().flush();
            }
            SearchUpdate::Paused => eprintln!("\nPaused."),
            SearchUpdate::Resumed => eprintln!("Resumed."),
            SearchUpdate::WorkerFailed { worker_id, reason } => {
                eprintln!("\nWorker {} stopped: {}", worker_id, reason);
            }
        }
    });

    match outcome {
        SearchOutcome::Found(result) => {
            if json_output {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                eprintln!();
                print_result(&result)?;
            }
            if let Some(output) = output {
                let path = write_key_file(output, &result)?;
                eprintln!("Keys saved to {}", path.display());
            }
            Ok(())
        }
        SearchOutcome::Cancelled(progress) => {
            if !json_output {
                eprintln!();
                eprintln!(
                    "Search cancelled after {} attempts ({}).",
                    progress.total_attempts,
                    format_duration(progress.elapsed())
                );
                print_retry_guidance(&report)?;
            }
            bail!("search cancelled")
        }
        SearchOutcome::Failed { reasons } => {
            if !json_output {
                eprintln!();
                for reason in &reasons {
                    eprintln!("  {}", reason);
                }
                print_retry_guidance(&report)?;
            }
            bail!("search failed: {}", reasons.join("; "))
        }
    }
}

/// Forward stdin lines to the controller until EOF or the search ends.
fn spawn_stdin_controls(controller: SearchController) -> Result<()> {
    thread::Builder::new()
        .name("stdin-controls".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let delivered = match line.trim().to_ascii_lowercase().as_str() {
                    "p" | "pause" => controller.pause(),
                    "r" | "resume" => controller.resume(),
                    "c" | "q" | "cancel" | "quit" => controller.cancel(),
                    "" => true,
                    other => {
                        eprintln!("\nUnknown command '{}'", other);
                        true
                    }
                };
                if !delivered {
                    break;
                }
            }
            debug!("Stdin controls finished");
        })
        .context("Failed to spawn stdin reader")?;
    Ok(())
}

fn cmd_analyze(characters: &str, position: PatternPosition, json_output: bool) -> Result<()> {
    let length = characters.chars().count();
    let report = analyze(characters, position, length);

    if json_output {
        let analysis = Analysis {
            pattern: characters,
            position,
            length,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("Pattern: {} ({}, {} characters)", characters, position, length);
        print_report(&mut std::io::stdout(), &report)?;
    }
    Ok(())
}

fn cmd_verify(address: &str, secret: &str) -> Result<()> {
    let bytes = parse_secret(secret)?;
    let keypair = KeyMaterial::from_secret_bytes(&bytes).context("Invalid secret key")?;
    let derived = keypair.address();

    if derived != address {
        bail!("secret key belongs to {}, not {}", derived, address);
    }

    println!("✓ Secret key matches {}", address);
    println!("Public Hex: {}", keypair.public_key_hex());
    Ok(())
}

/// Accept a Solana keypair-file style JSON array or a base58 string.
fn parse_secret(secret: &str) -> Result<Vec<u8>> {
    let secret = secret.trim();
    if secret.starts_with('[') {
        serde_json::from_str::<Vec<u8>>(secret).context("Secret is not a JSON byte array")
    } else {
        base58_decode(secret).context("Secret is not valid base58")
    }
}

fn cmd_benchmark(duration_secs: u64, profile: PerformanceProfile) -> Result<()> {
    let config = SearchConfig::from_profile(profile);
    let pattern = VanityPattern::prefix(BENCHMARK_PATTERN)?;
    let space = search_space(pattern.len());
    let search = VanitySearch::start(pattern, &config)?;

    eprintln!("Benchmarking for {} seconds...", duration_secs);
    eprintln!("Profile: {} ({} workers)", profile, search.worker_count());
    eprintln!();

    let controller = search.controller();
    thread::Builder::new()
        .name("benchmark-timer".to_string())
        .spawn(move || {
            thread::sleep(Duration::from_secs(duration_secs));
            controller.cancel();
        })
        .context("Failed to spawn benchmark timer")?;

    let outcome = search.run(|update| {
        if let SearchUpdate::Progress(progress) = update {
            eprint!("\r{}", progress.format(space));
            let _ = std::io::stderr().flush();
        }
    });
    eprintln!();

    match outcome {
        SearchOutcome::Cancelled(progress) => {
            let secs = progress.elapsed().as_secs_f64();
            let rate = if secs > 0.0 {
                progress.total_attempts as f64 / secs
            } else {
                0.0
            };
            println!("Keys Tested: {}", progress.total_attempts);
            println!("Time:        {:.2}s", secs);
            println!("Speed:       {} key/s", format_count(rate));
            for length in 3..=6 {
                let eta = estimate_time(length, rate)
                    .map(format_duration)
                    .unwrap_or_else(|| "?".to_string());
                println!("  {}-character pattern: ~{}", length, eta);
            }
            eprintln!("\nBenchmark complete!");
            Ok(())
        }
        SearchOutcome::Found(result) => {
            print_result(&result)?;
            Ok(())
        }
        SearchOutcome::Failed { reasons } => bail!("benchmark failed: {}", reasons.join("; ")),
    }
}

fn print_report(out: &mut impl Write, report: &DifficultyReport) -> Result<()> {
    writeln!(out, "Difficulty:  {} ({})", report.level, report.level.description())?;
    writeln!(out, "Expected:    ~{} attempts", report.estimated_attempts)?;
    writeln!(out, "Tips:")?;
    for tip in &report.tips {
        writeln!(out, "  - {}", tip)?;
    }
    writeln!(out, "Suggestions:")?;
    for suggestion in &report.suggestions {
        writeln!(out, "  - {}", suggestion)?;
    }
    Ok(())
}

fn print_retry_guidance(report: &DifficultyReport) -> Result<()> {
    let mut err = std::io::stderr();
    writeln!(err, "No address was found. You can retry the same pattern or pick an easier one.")?;
    print_report(&mut err, report)
}

fn key_file_name(address: &str) -> String {
    let head: String = address.chars().take(8).collect();
    format!("solana-vanity-{}.json", head)
}

/// Write the key file, owner-readable only where the platform allows.
///
/// `output` may be a file path or an existing directory.
fn write_key_file(output: &Path, result: &SearchResult) -> Result<PathBuf> {
    let path = if output.is_dir() {
        output.join(key_file_name(&result.public_key))
    } else {
        output.to_path_buf()
    };

    let json = serde_json::to_string_pretty(&KeyFile::new(result, Utc::now()))?;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(&path)
        .with_context(|| format!("Failed to create key file {}", path.display()))?;
    file.write_all(json.as_bytes())
        .and_then(|_| file.write_all(b"\n"))
        .with_context(|| format!("Failed to write key file {}", path.display()))?;

    Ok(path)
}

fn print_result(result: &SearchResult) -> Result<()> {
    println!();
    println!("🎉 MATCH FOUND!");
    println!("{:-<60}", "");
    println!("Address:     {}", result.public_key);
    println!("Keypair:     {}", serde_json::to_string(&result.keypair)?);
    println!("Public Hex:  {}", result.keypair.public_key_hex());
    println!("{:-<60}", "");
    println!("Keys Tested: {} ({} by worker {})", result.total_attempts, result.attempts, result.worker_id);
    println!("Time:        {}", format_duration(Duration::from_millis(result.duration_ms)));
    Ok(())
}
