use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;

use taxeval_rs::refdb::read_reference_databases;
use taxeval_rs::report::write_per_level_accuracy;
use taxeval_rs::simulate::AmpliconTrim;
use taxeval_rs::{
    discover_parameter_dirs, evaluate_runs, generate_simulated_datasets, EvaluationMode, Holdout,
    SimulationParams,
};

#[derive(Parser)]
#[command(name = "taxeval-rs", version, about = "Simulate and score taxonomy classifier benchmarks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build cross-validated and novel-taxa query/reference splits
    Simulate {
        /// Reference descriptor table (TSV)
        #[arg(long)]
        databases: PathBuf,
        /// Directory receiving cross-validated/ and novel-taxa-simulations/
        #[arg(long, short)]
        output: PathBuf,
        #[arg(long, default_value_t = 10)]
        iterations: usize,
        #[arg(long, default_value_t = 2)]
        min_count: usize,
        /// "cv" or a rank level; repeat for several (default: cv 6 5 4 3 2 1)
        #[arg(long = "holdout")]
        holdouts: Vec<Holdout>,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Trim reference sequences to the region between the primers
        #[arg(long)]
        amplicon: bool,
        /// With --amplicon, keep only the first N bases of each amplicon
        #[arg(long, requires = "amplicon")]
        read_length: Option<usize>,
    },
    /// Score classifier assignments against the simulated truth
    Evaluate {
        /// Root holding <dataset>/<dataset>/<method>/<params>/ result directories
        #[arg(long)]
        results: PathBuf,
        /// Root holding the simulated <dataset>/query_taxa.tsv splits
        #[arg(long)]
        input_root: PathBuf,
        /// novel-taxa or cross-validated
        #[arg(long)]
        mode: EvaluationMode,
        #[arg(long, default_value = "evaluate_classification_summary.tsv")]
        summary: PathBuf,
        #[arg(long)]
        per_level: Option<PathBuf>,
    },
}

fn spinner(color: &str, msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template(&format!("{{spinner:.{color}}} {{msg}}"))
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(msg.to_string());
    spinner
}

fn fail(spinner: &ProgressBar, context: &str, err: impl std::fmt::Display) -> ! {
    spinner.abandon_with_message(format!("{context} failed."));
    eprintln!("error: {err}");
    process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Simulate {
            databases,
            output,
            iterations,
            min_count,
            holdouts,
            seed,
            amplicon,
            read_length,
        } => {
            // 1. Reference descriptors
            let sp = spinner("blue", "Reading reference descriptors...");
            let dbs = read_reference_databases(&databases)
                .unwrap_or_else(|e| fail(&sp, "Reading descriptors", e));
            sp.finish_with_message(format!("Found {} reference database(s).", dbs.len()));

            // 2. Splits
            let mut params = SimulationParams {
                iterations,
                min_count,
                seed,
                amplicon: amplicon.then_some(AmpliconTrim { read_length }),
                ..Default::default()
            };
            if !holdouts.is_empty() {
                params.holdouts = holdouts;
            }

            let sp = spinner("green", "Generating simulated datasets...");
            let written = generate_simulated_datasets(&dbs, &output, &params)
                .unwrap_or_else(|e| fail(&sp, "Simulation", e));
            sp.finish_with_message(format!(
                "Wrote {} split(s) under {}.",
                written.len(),
                output.display()
            ));
        }
        Command::Evaluate {
            results,
            input_root,
            mode,
            summary,
            per_level,
        } => {
            // 1. Result directories
            let sp = spinner("blue", "Gathering classifier result directories...");
            let dirs = discover_parameter_dirs(&results)
                .unwrap_or_else(|e| fail(&sp, "Directory scan", e));
            sp.finish_with_message(format!("Found {} parameter director(ies).", dirs.len()));

            // 2. Scoring
            let sp = spinner("green", "Evaluating assignments...");
            let evaluation = evaluate_runs(&dirs, &input_root, &summary, mode)
                .unwrap_or_else(|e| fail(&sp, "Evaluation", e));
            sp.finish_with_message(format!("Summary written to {}.", summary.display()));

            // 3. Per-level table
            if let Some(path) = per_level {
                let sp = spinner("yellow", "Writing per-level accuracy...");
                write_per_level_accuracy(&path, &evaluation.per_level)
                    .unwrap_or_else(|e| fail(&sp, "Per-level output", e));
                sp.finish_with_message(format!(
                    "{} per-level row(s) written to {}.",
                    evaluation.per_level.len(),
                    path.display()
                ));
            }
        }
    }

    let sp = spinner("cyan", "All done!");
    sp.finish_with_message("All done!");
}
