//! Command-line front end: loads a topology, discretises and binds a sample
//! matrix, trains the conditional probability tables and answers queries in
//! a line-oriented REPL until `exit`.

use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use categorical_bayes::prelude::*;
use clap::Parser as _;
use log::info;

#[derive(Debug, clap::Parser)]
#[command(name = "categorical-bayes", version, about)]
struct Cli {
    /// Topology file: one .tgf file, or a .na node file followed by a .sif
    /// edge file (pass the flag twice).
    #[arg(long = "network", required = true, value_name = "FILE")]
    network: Vec<PathBuf>,
    /// Sample matrix; rows are variables, columns are samples.
    data_file: PathBuf,
    /// Discretisation control file (JSON).
    control_file: PathBuf,
    /// Dump the trained CPTs to a timestamped tab-separated file before the
    /// REPL starts.
    #[arg(long)]
    dump_parameters: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut network = Network::new();
    for path in &cli.network {
        network
            .read_network(path)
            .with_context(|| format!("loading topology `{}`", path.display()))?;
    }

    let raw = NamedMatrix::<String>::from_path(&cli.data_file)
        .with_context(|| format!("reading samples `{}`", cli.data_file.display()))?;
    let settings = DiscretisationSettings::from_path(&cli.control_file)
        .with_context(|| format!("reading control file `{}`", cli.control_file.display()))?;
    let samples = discretise(&raw, &settings).context("discretising samples")?;
    bind_samples(&mut network, &samples).context("binding samples to the network")?;
    train(&mut network).context("training conditional probability tables")?;
    info!("network ready: {} nodes", network.node_count());

    if cli.dump_parameters {
        let path = network.save_parameters(Path::new("."))?;
        info!("wrote parameters to `{}`", path.display());
    }

    repl(&mut network)
}

/// Reads one query per line; parse and inference errors are reported on
/// stderr and the loop continues.
fn repl(network: &mut Network) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            break;
        }
        match run_query(network, line) {
            Ok((probability, labels)) => {
                println!("{probability}");
                for label in labels {
                    println!("{label}");
                }
            }
            Err(error) => eprintln!("{error}"),
        }
    }
    Ok(())
}

fn run_query(network: &mut Network, line: &str) -> anyhow::Result<(f64, Vec<String>)> {
    let plan = Parser::new(line, network).parse_query()?;
    Ok(plan.execute(network)?)
}
