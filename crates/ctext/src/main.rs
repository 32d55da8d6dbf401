//! # ctext
//!
//! ```text
//! ctext encode [--strategy sequential|threaded|distributed] [--workers N]
//!              [--sharding file|position] [--merge-order first-seen|lexicographic]
//!              [--build reduction|locked] [--layout per-file|run-wide]
//!              [--out-dir DIR] [--json] <file>...
//! ctext decode [--lossy] [--out-dir DIR] [--json] <stem-or-file>...
//! ```
//!
//! Exits 1 when an encode input was missing or on any fatal error, and 2 on
//! usage errors.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use compactext::{
    ArtifactLayout, BuildMode, DecodeOptions, DecodeReport, EncodeOptions, EncodeReport,
    FileStatus, MergeOrder, SeparatorMode, Sharding, Strategy, decode_files, encode_files,
};
use env_logger::Env;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Dictionary word encoder", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode text files into vocabulary and stream artifacts
    Encode(EncodeArgs),
    /// Reconstruct text from encoded artifacts
    Decode(DecodeArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Sequential,
    Threaded,
    Distributed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShardingArg {
    File,
    Position,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MergeOrderArg {
    FirstSeen,
    Lexicographic,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum BuildArg {
    Reduction,
    Locked,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    PerFile,
    RunWide,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Text files to encode
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Execution strategy
    #[arg(long, value_enum, default_value_t = StrategyArg::Sequential)]
    strategy: StrategyArg,

    /// Worker count for threaded/distributed runs (default: available cores)
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Split work by whole file or by token position
    #[arg(long, value_enum, default_value_t = ShardingArg::File)]
    sharding: ShardingArg,

    /// Order of one worker's words in the merge
    #[arg(long, value_enum, default_value_t = MergeOrderArg::FirstSeen)]
    merge_order: MergeOrderArg,

    /// Vocabulary build for threaded runs
    #[arg(long, value_enum, default_value_t = BuildArg::Reduction)]
    build: BuildArg,

    /// One vocabulary per stream, or one vocab.bin per directory
    #[arg(long, value_enum, default_value_t = LayoutArg::PerFile)]
    layout: LayoutArg,

    /// Directory for the artifacts
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Stems (or any artifact path) to decode
    #[arg(required = true)]
    stems: Vec<PathBuf>,

    /// Join tokens with single spaces instead of the stored separators
    #[arg(long)]
    lossy: bool,

    /// Directory for the reconstructed text
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    run(cli)
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
    }
}

fn init_logging(
    verbose: u8,
    quiet: u8,
) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    builder.init();
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl EncodeArgs {
    fn options(&self) -> EncodeOptions {
        let workers = self.workers.unwrap_or_else(default_workers);
        let strategy = match self.strategy {
            StrategyArg::Sequential => Strategy::Sequential,
            StrategyArg::Threaded => Strategy::Threaded { threads: workers },
            StrategyArg::Distributed => Strategy::Distributed { workers },
        };
        EncodeOptions::default()
            .with_strategy(strategy)
            .with_sharding(match self.sharding {
                ShardingArg::File => Sharding::ByFile,
                ShardingArg::Position => Sharding::ByPosition,
            })
            .with_merge_order(match self.merge_order {
                MergeOrderArg::FirstSeen => MergeOrder::FirstSeen,
                MergeOrderArg::Lexicographic => MergeOrder::Lexicographic,
            })
            .with_build(match self.build {
                BuildArg::Reduction => BuildMode::Reduction,
                BuildArg::Locked => BuildMode::Locked,
            })
            .with_layout(match self.layout {
                LayoutArg::PerFile => ArtifactLayout::PerFile,
                LayoutArg::RunWide => ArtifactLayout::RunWide,
            })
            .with_out_dir(self.out_dir.clone())
    }
}

impl DecodeArgs {
    fn options(&self) -> DecodeOptions {
        DecodeOptions::default()
            .with_mode(if self.lossy {
                SeparatorMode::SingleSpace
            } else {
                SeparatorMode::Preserve
            })
            .with_out_dir(self.out_dir.clone())
    }
}

fn run_encode(args: EncodeArgs) -> Result<ExitCode> {
    let options = args.options();
    let report = encode_files(&args.inputs, &options).context("encode failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_encode_summary(&report);
    }

    if report.has_missing() {
        for file in report.missing() {
            log::error!("missing input: {}", file.input.display());
        }
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_encode_summary(report: &EncodeReport) {
    for file in &report.files {
        match (file.status, &file.stream) {
            (FileStatus::Encoded, Some(stream)) => println!(
                "encoded {} -> {}  words={}  bytes={}",
                file.input.display(),
                stream.display(),
                file.tokens,
                file.bytes
            ),
            _ => println!("skipped {}", file.input.display()),
        }
    }
    println!(
        "=== {:?} encode: {} words, vocabulary {}, {:.4} s ===",
        report.strategy,
        report.total_tokens(),
        report.vocab_size,
        report.elapsed_secs
    );
}

fn run_decode(args: DecodeArgs) -> Result<ExitCode> {
    let options = args.options();
    let report = decode_files(&args.stems, &options).context("decode failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_decode_summary(&report);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_decode_summary(report: &DecodeReport) {
    for file in &report.files {
        println!(
            "decoded {} -> {}  words={}",
            file.stream.display(),
            file.output.display(),
            file.tokens
        );
    }
    println!(
        "=== decode total: {} files, {:.4} s ===",
        report.files.len(),
        report.elapsed_secs
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_encode_args() {
        let cli = Cli::try_parse_from([
            "ctext",
            "-vv",
            "encode",
            "--strategy",
            "distributed",
            "--workers",
            "5",
            "--sharding",
            "position",
            "--merge-order",
            "lexicographic",
            "--layout",
            "run-wide",
            "a.txt",
            "b.txt",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);

        let Commands::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        let options = args.options();
        assert_eq!(options.strategy, Strategy::Distributed { workers: 5 });
        assert_eq!(options.sharding, Sharding::ByPosition);
        assert_eq!(options.merge_order, MergeOrder::Lexicographic);
        assert_eq!(options.build, BuildMode::Reduction);
        assert_eq!(options.layout, ArtifactLayout::RunWide);
        assert_eq!(args.inputs, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
    }

    #[test]
    fn test_usage_errors() {
        assert!(Cli::try_parse_from(["ctext", "encode"]).is_err());
        assert!(Cli::try_parse_from(["ctext", "encode", "--strategy", "gpu", "a.txt"]).is_err());
        assert!(Cli::try_parse_from(["ctext", "frobnicate"]).is_err());
    }

    #[test]
    fn test_encode_then_decode() {
        tempdir::TempDir::new("ctext_test")
            .and_then(|dir| {
                let input = dir.path().join("doc.txt");
                std::fs::write(&input, b"one two  three\n\tone\n")?;
                let out = dir.path().join("out");

                let cli = Cli::try_parse_from([
                    "ctext".into(),
                    "encode".into(),
                    "--strategy".into(),
                    "threaded".into(),
                    "-w".into(),
                    "2".into(),
                    "--out-dir".into(),
                    out.clone().into_os_string(),
                    input.clone().into_os_string(),
                ])
                .unwrap();
                assert_eq!(run(cli).unwrap(), ExitCode::SUCCESS);

                let cli = Cli::try_parse_from([
                    "ctext".into(),
                    "decode".into(),
                    out.join("doc").into_os_string(),
                ])
                .unwrap();
                assert_eq!(run(cli).unwrap(), ExitCode::SUCCESS);
                assert_eq!(
                    std::fs::read(out.join("doc_recon.txt"))?,
                    b"one two  three\n\tone\n"
                );

                let cli = Cli::try_parse_from([
                    "ctext".into(),
                    "encode".into(),
                    input.into_os_string(),
                    dir.path().join("absent.txt").into_os_string(),
                ])
                .unwrap();
                assert_eq!(run(cli).unwrap(), ExitCode::FAILURE);
                Ok(())
            })
            .unwrap();
    }
}
