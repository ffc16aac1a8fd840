//! Train and evaluate the traffic anomaly classifier on synthetic flows.
//!
//! ```text
//! traffic-anomaly [CONFIG] [--data samples.csv] [--save model.json]
//! ```

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use traffic_gbdt::{
    load_samples_csv, resolve_config, save_pipeline, Predictor, SampleGenerator, TrafficSample,
    TrainingPipeline,
};

struct CliOptions {
    config: Option<PathBuf>,
    data: Option<PathBuf>,
    save: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        println!("{}", help_text());
        return Ok(());
    };
    traffic_gbdt::init();

    let config = resolve_config(options.config.as_ref()).context("failed to load configuration")?;

    let samples = match &options.data {
        Some(path) => load_samples_csv(path)
            .with_context(|| format!("failed to load samples from {}", path.display()))?,
        None => SampleGenerator::from_config(&config)?.generate(config.sample_count, config.seed)?,
    };

    let pipeline = TrainingPipeline::fit(&samples, &config).context("training failed")?;
    let metrics = pipeline.evaluate(&samples).context("evaluation failed")?;
    println!("{metrics}");

    let predictor = Predictor::default();
    for (packet_count, avg_packet_size) in [(150, 500), (400, 1500)] {
        let flow = TrafficSample {
            packet_count,
            avg_packet_size,
            ..TrafficSample::default()
        };
        let prediction = predictor.predict(&pipeline, &flow)?;
        println!(
            "PacketCount={packet_count}, AvgPacketSize={avg_packet_size} -> {prediction}"
        );
    }

    if let Some(path) = &options.save {
        save_pipeline(path, &pipeline)
            .with_context(|| format!("failed to save model to {}", path.display()))?;
        println!("Model saved to {}", path.display());
    }

    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Option<CliOptions>> {
    let mut options = CliOptions {
        config: None,
        data: None,
        save: None,
    };

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Ok(None),
            "--save" => {
                idx += 1;
                let value = args.get(idx).context("--save requires a value")?;
                options.save = Some(PathBuf::from(value));
            }
            "--data" => {
                idx += 1;
                let value = args.get(idx).context("--data requires a value")?;
                options.data = Some(PathBuf::from(value));
            }
            flag if flag.starts_with('-') => bail!("Unknown argument: {flag}\n{}", help_text()),
            path => {
                if options.config.is_some() {
                    bail!("Only one configuration file may be given");
                }
                options.config = Some(PathBuf::from(path));
            }
        }
        idx += 1;
    }
    Ok(Some(options))
}

fn help_text() -> String {
    [
        "Usage: traffic-anomaly [CONFIG] [--data <csv>] [--save <model>]",
        "",
        "  CONFIG          Training configuration (.toml or .json)",
        "  --data <csv>    Train on labelled samples from CSV instead of generating them",
        "  --save <model>  Persist the fitted pipeline (.json, .bin or .bincode)",
        "",
        "Environment variables prefixed with TRAFFIC_GBDT_ override configuration values.",
    ]
    .join("\n")
}
