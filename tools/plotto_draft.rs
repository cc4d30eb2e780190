/// Draft tool: builds a selection against a corpus and prints the composed
/// draft.
///
/// Usage: plotto_draft [--config <file>] --corpus <file> [--seed n] [--random] [--character A]
///        [--subject n] [--predicate n] [--conflict id] [--outcome n] [--recommend]

use clap::Parser;
use plot_engine::core::recommend::{ConflictSummary, Source};
use plot_engine::core::selector::SelectionChange;
use plot_engine::{Category, PlotEngine, SelectedElements};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plotto_draft", about = "Compose a plot draft from a Plotto corpus")]
struct Cli {
    /// Corpus file (overrides the config's corpus path)
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Engine config file in RON
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for recommendations and random selection
    #[arg(long)]
    seed: Option<u64>,
    /// Start from a random selection instead of an empty one
    #[arg(long)]
    random: bool,
    /// Character designation to toggle (repeatable)
    #[arg(long = "character")]
    characters: Vec<String>,
    /// Subject number to toggle (repeatable)
    #[arg(long = "subject")]
    subjects: Vec<String>,
    /// Predicate number
    #[arg(long)]
    predicate: Option<String>,
    /// Conflict id to toggle, in order (repeatable)
    #[arg(long = "conflict")]
    conflicts: Vec<String>,
    /// Outcome number
    #[arg(long)]
    outcome: Option<String>,
    /// Also print recommended conflicts for the final selection
    #[arg(long)]
    recommend: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut builder = PlotEngine::builder();
    if let Some(ref path) = cli.config {
        builder = builder.config_file(path);
    }
    if let Some(ref path) = cli.corpus {
        builder = builder.corpus_path(path);
    }
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    let mut engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };
    for warning in engine.warnings() {
        eprintln!("WARNING: {}", warning);
    }

    let mut selection = if cli.random {
        engine.random_selection()
    } else {
        SelectedElements::new()
    };

    // Predicate before conflicts, since conflicts lock it.
    let requests = cli
        .characters
        .iter()
        .map(|id| (Category::Characters, id))
        .chain(cli.subjects.iter().map(|id| (Category::Subjects, id)))
        .chain(cli.predicate.iter().map(|id| (Category::Predicates, id)))
        .chain(cli.conflicts.iter().map(|id| (Category::Conflicts, id)))
        .chain(cli.outcome.iter().map(|id| (Category::Outcomes, id)));
    for (category, id) in requests {
        if let SelectionChange::Ignored(reason) = engine.select(&mut selection, category, id) {
            eprintln!("WARNING: {} {:?} ignored: {:?}", category, id, reason);
        }
    }

    let draft = engine.compose_with_report(&selection);
    print!("{}", draft.text);
    if !draft.unresolved.is_empty() {
        let names: Vec<&str> = draft.unresolved.iter().map(|d| d.as_str()).collect();
        eprintln!("WARNING: no description for {}", names.join(", "));
    }

    if cli.recommend {
        let recs = engine.recommend(&selection);
        println!("\nRecommended conflicts:");
        if recs.is_empty() {
            println!("  (none)");
        }
        for rec in &recs {
            println!("  {}", summary_line(rec));
        }
    }
}

fn summary_line(rec: &ConflictSummary) -> String {
    let source = match &rec.source {
        Source::Predicate(n) => format!("from predicate {}", n),
        Source::Corpus => "from the corpus".to_string(),
        Source::LeadUp(id) => format!("leads up to {}", id),
        Source::CarryOn(id) => format!("carries on from {}", id),
    };
    format!(
        "[{}] {} / {} ({})",
        rec.id, rec.category, rec.subcategory, source
    )
}
