use std::path::Path;
use std::process;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use assemblies::observer::BrainAdapter;
use assemblies::prelude::*;
use assemblies::prng::Prng;

const AREA: &str = "vocab";

/// Demo settings, optionally loaded from a JSON file with `--config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    brain: BrainConfig,
    area: AreaConfig,
    stimulus: StimulusConfig,
    training_rounds: usize,
    words: Vec<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            brain: BrainConfig::default().with_seed(7),
            area: AreaConfig::default(),
            stimulus: StimulusConfig::default(),
            training_rounds: 30,
            words: ["apple", "river", "stone", "cloud", "ember"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut command = None;
    let mut config_path = None;
    let mut seed = None;

    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--help" | "-h" | "help" => {
                print_help();
                return;
            }
            "--config" => config_path = it.next().cloned(),
            "--seed" => match it.next().map(|s| s.parse::<u64>()) {
                Some(Ok(s)) => seed = Some(s),
                _ => {
                    eprintln!("--seed expects an unsigned integer");
                    process::exit(2);
                }
            },
            other if command.is_none() => command = Some(other.to_string()),
            other => {
                eprintln!("Unexpected argument: {other}");
                print_help();
                process::exit(2);
            }
        }
    }

    let mut cfg = match config_path {
        Some(path) => match load_config(Path::new(&path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Could not load config {path}: {e}");
                process::exit(1);
            }
        },
        None => DemoConfig::default(),
    };
    if let Some(seed) = seed {
        cfg.brain = cfg.brain.with_seed(seed);
    }

    let result = match command.as_deref().unwrap_or("recall") {
        "recall" => run_recall_demo(&cfg),
        "converge" => run_converge_demo(&cfg),
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
            process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn print_help() {
    println!("assemblies (assembly calculus simulator)");
    println!("usage:");
    println!("  cargo run -- [recall]            train, save and recall word assemblies");
    println!("  cargo run -- converge            watch one assembly stabilize");
    println!("  cargo run -- <cmd> --config demo.json --seed 42");
    println!("  cargo run -- --help");
}

fn load_config(path: &Path) -> Result<DemoConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn build_brain(cfg: &DemoConfig) -> Result<Brain, BrainError> {
    let mut brain = Brain::new(cfg.brain);
    brain.create_area_with(AREA, cfg.area)?;
    for word in &cfg.words {
        brain.create_stimulus_with(word, cfg.stimulus)?;
    }
    Ok(brain)
}

fn run_recall_demo(cfg: &DemoConfig) -> Result<(), BrainError> {
    let mut brain = build_brain(cfg)?;

    // Interleave words in a shuffled order so no word gets a head start.
    let mut order: Vec<&String> = cfg.words.iter().collect();
    Prng::new(cfg.brain.seed.unwrap_or(BrainConfig::DEFAULT_SEED)).shuffle(&mut order);
    info!(order = ?order, rounds = cfg.training_rounds, "training");
    for word in &order {
        let request = Projection::new().stimulus(word.as_str(), [AREA]);
        for _ in 0..cfg.training_rounds {
            brain.project(&request)?;
        }
    }

    for word in &cfg.words {
        brain.save_assembly(AREA, word)?;
    }

    let k = brain.area_named(AREA)?.winner_count();
    let mut correct = 0;
    for word in &cfg.words {
        brain.project(&Projection::new().stimulus(word.as_str(), [AREA]))?;
        let recall = brain.read_assembly(AREA)?;
        let recognized = brain.recognize(AREA)?;
        match recall {
            Recall::Match { overlap, .. } => {
                println!(
                    "{word:<10} -> {:<10} overlap={overlap}/{}",
                    recognized.unwrap_or("?"),
                    k
                );
            }
            Recall::NoMatch => println!("{word:<10} -> (no match)"),
        }
        if recognized == Some(word.as_str()) {
            correct += 1;
        } else {
            warn!(word = word.as_str(), ?recognized, "misrecognized");
        }
    }
    println!("recalled {correct}/{} words", cfg.words.len());

    let snapshot = BrainAdapter::new(&brain).snapshot();
    match serde_json::to_string_pretty(&snapshot.diagnostics) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!("could not serialize diagnostics: {}", e),
    }
    Ok(())
}

fn run_converge_demo(cfg: &DemoConfig) -> Result<(), BrainError> {
    let mut brain = build_brain(cfg)?;
    let Some(word) = cfg.words.first() else {
        println!("no words configured");
        return Ok(());
    };

    let request = Projection::new().stimulus(word.as_str(), [AREA]);
    let mut previous: Vec<NeuronId> = Vec::new();
    for round in 0..cfg.training_rounds.max(1) {
        let report = brain.project(&request)?;
        let winners = brain.winners(AREA)?;
        let kept = assemblies::area::overlap_count(&previous, winners);
        println!(
            "round={round:3} winners={} kept={kept:3} reinforced={}",
            winners.len(),
            report.reinforced_synapses
        );
        if winners == previous.as_slice() {
            info!(round, "assembly stable");
            break;
        }
        previous = winners.to_vec();
    }
    Ok(())
}
