/// Corpus linter: parses a plot corpus and reports warnings and dangling
/// references.
///
/// Usage: plotto_lint <corpus.ron>

use clap::Parser;
use plot_engine::core::corpus::CorpusParser;
use plot_engine::core::graph::{ConflictGraph, DanglingRef};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plotto_lint", about = "Validate a Plotto corpus file")]
struct Cli {
    /// Corpus file to check
    corpus: PathBuf,
    /// Treat parse warnings as errors
    #[arg(long)]
    strict: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let parsed = match CorpusParser::load(&cli.corpus) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("ERROR: {}: {}", cli.corpus.display(), e);
            process::exit(1);
        }
    };

    let data = &parsed.data;
    println!(
        "Loaded {} characters, {} subjects, {} predicates, {} conflicts, {} outcomes",
        data.characters().len(),
        data.subjects().len(),
        data.predicates().len(),
        data.conflicts().len(),
        data.outcomes().len()
    );

    for warning in &parsed.warnings {
        println!("WARNING: {}", warning);
    }

    let diagnostics = ConflictGraph::new(data).diagnostics();
    for dangling in &diagnostics.dangling {
        println!("ERROR: {}", describe(dangling));
    }

    println!(
        "\n{} warning(s), {} dangling reference(s)",
        parsed.warnings.len(),
        diagnostics.skipped_references()
    );

    if !diagnostics.is_clean() || (cli.strict && !parsed.warnings.is_empty()) {
        process::exit(1);
    }
}

fn describe(dangling: &DanglingRef) -> String {
    match dangling {
        DanglingRef::Conflict {
            source,
            relation,
            target,
        } => format!(
            "conflict {} {} link to unknown conflict {}",
            source,
            relation.name(),
            target
        ),
        DanglingRef::Predicate { number, target } => {
            format!("predicate {} links to unknown conflict {}", number, target)
        }
        DanglingRef::Character {
            conflict,
            permutation,
            designation,
        } => format!(
            "conflict {} permutation {} names unknown character {}",
            conflict, permutation, designation
        ),
    }
}
