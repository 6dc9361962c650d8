// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use anyhow::{anyhow, bail, Context, Result};
use std::env;

use vibe::{analyze_melody, Algorithm, AnalysisConfig, KeyId, Precision};

fn print_usage() {
    println!("VIBE - Melodic key detection and chord suggestion");
    println!();
    println!("Usage: vibe [OPTIONS] NOTE...");
    println!();
    println!("Options:");
    println!("  --algorithm <hmm|scoring>  Key detection algorithm (default hmm)");
    println!("  --precision <linear|log>   Viterbi arithmetic (default linear)");
    println!("  --key <NAME>               Use this key, e.g. \"Sol Majeur\"");
    println!("  --window <N>               Scoring window in notes (default 6)");
    println!("  --options <N>              Chord options per note (default 2)");
    println!("  --config <FILE>            Load settings from a YAML or TOML file");
    println!("  --help                     Show this help message");
    println!();
    println!("Example: vibe --key \"Do Majeur\" C4 E4 G4 A4");
}

/// Parsed command line
struct Invocation {
    config: AnalysisConfig,
    key: Option<KeyId>,
    notes: Vec<String>,
}

fn option_value<'a>(args: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    args.next()
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} requires a value", flag))
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    // The config file is applied first so flags can override it
    let mut config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args
                .get(i + 1)
                .ok_or_else(|| anyhow!("--config requires a file"))?;
            AnalysisConfig::load(path)?
        }
        None => AnalysisConfig::default(),
    };

    let mut key = None;
    let mut notes = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                option_value(&mut iter, arg)?;
            }
            "--algorithm" => {
                config.algorithm = option_value(&mut iter, arg)?.parse::<Algorithm>()?;
            }
            "--precision" => {
                config.precision = option_value(&mut iter, arg)?.parse::<Precision>()?;
            }
            "--key" => {
                key = Some(option_value(&mut iter, arg)?.parse::<KeyId>()?);
            }
            "--window" => {
                let value = option_value(&mut iter, arg)?;
                config.window_size = value
                    .parse()
                    .with_context(|| format!("Invalid window size: {}", value))?;
            }
            "--options" => {
                let value = option_value(&mut iter, arg)?;
                config.chord_options = value
                    .parse()
                    .with_context(|| format!("Invalid option count: {}", value))?;
            }
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            note => notes.push(note.to_string()),
        }
    }

    config.validate()?;
    Ok(Invocation { config, key, notes })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        println!("VIBE - Melodic key detection and chord suggestion");
        println!("Run with --help for usage information");
        return Ok(());
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    let analysis = analyze_melody(&invocation.notes, invocation.key, &invocation.config);
    let yaml = serde_yaml::to_string(&analysis).context("Failed to serialize analysis")?;
    print!("{}", yaml);

    Ok(())
}
