//! schedsim: simulate FCFS, SRT and RR scheduling of a process file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use schedsim::{
    init_tracing, parse_processes, write_report, write_report_json, Algorithm, Scenario,
    Simulator,
};

/// Simulate single-CPU process scheduling and print the decision trace.
#[derive(Parser)]
#[command(name = "schedsim")]
struct Cli {
    /// Process file: one `pid|arrival|burst|num-bursts|io` line per process.
    input: PathBuf,

    /// Write per-algorithm statistics to this file.
    stats_out: Option<PathBuf>,

    /// Algorithm(s) to simulate, in order. Defaults to fcfs, srt, rr.
    #[arg(
        short,
        long = "algorithm",
        value_name = "ALGO",
        env = "SCHEDSIM_ALGORITHMS",
        value_delimiter = ','
    )]
    algorithms: Vec<Algorithm>,

    /// Format of the statistics file.
    #[arg(long, value_enum, default_value_t = StatsFormat::Text)]
    format: StatsFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatsFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let text = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let processes = parse_processes(&text)
        .with_context(|| format!("invalid input file {}", cli.input.display()))?;
    let scenario = Scenario::from_processes(processes)?;

    let algorithms: &[Algorithm] = if cli.algorithms.is_empty() {
        &Algorithm::ALL
    } else {
        &cli.algorithms
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut runs = Vec::with_capacity(algorithms.len());
    for (i, &algo) in algorithms.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        let result = Simulator::new(algo).run(&scenario);
        result.trace.write_to(&mut out)?;
        runs.push(result.stats);
    }
    out.flush()?;

    if let Some(path) = &cli.stats_out {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        let written = match cli.format {
            StatsFormat::Text => write_report(&mut w, &runs),
            StatsFormat::Json => write_report_json(&mut w, &runs),
        };
        written
            .and_then(|()| w.flush())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote statistics");
    }

    Ok(())
}
