//! Session facade: corpus, seeded randomness and every engine operation
//! behind one handle.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::composer::{ComposedDraft, StoryComposer};
use crate::core::config::{ConfigError, EngineConfig};
use crate::core::corpus::{CorpusParser, ParseError, ParseWarning};
use crate::core::graph::{ConflictGraph, CorpusDiagnostics};
use crate::core::recommend::{ConflictSummary, Placement, RelatedConflictResolver};
use crate::core::selector::{ElementSelector, SelectionChange};
use crate::schema::plotto::PlottoData;
use crate::schema::selection::{Category, SelectedElements};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("corpus error: {0}")]
    Parse(#[from] ParseError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("no corpus configured: set a corpus path or provide data")]
    MissingCorpus,
}

/// The plot engine for one process or session. Built via
/// `PlotEngine::builder()`.
///
/// The corpus is read-only after construction. The only mutable state is
/// the random source, so the same seed and call sequence give the same
/// results.
pub struct PlotEngine {
    data: PlottoData,
    warnings: Vec<ParseWarning>,
    config: EngineConfig,
    rng: StdRng,
}

/// Builder for constructing a `PlotEngine`.
pub struct PlotEngineBuilder {
    config: EngineConfig,
    config_path: Option<PathBuf>,
    corpus_path: Option<PathBuf>,
    seed: Option<u64>,
    /// Directly provided corpus (for testing without files).
    corpus: Option<PlottoData>,
}

impl PlotEngine {
    pub fn builder() -> PlotEngineBuilder {
        PlotEngineBuilder {
            config: EngineConfig::default(),
            config_path: None,
            corpus_path: None,
            seed: None,
            corpus: None,
        }
    }

    pub fn data(&self) -> &PlottoData {
        &self.data
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Warnings raised while parsing the corpus file, if one was loaded.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn select(
        &self,
        selection: &mut SelectedElements,
        category: Category,
        id: &str,
    ) -> SelectionChange {
        ElementSelector::new(&self.data).select(selection, category, id)
    }

    /// Up to three related conflicts for the current selection.
    pub fn recommend(&mut self, selection: &SelectedElements) -> Vec<ConflictSummary> {
        RelatedConflictResolver::new(ConflictGraph::new(&self.data)).recommend(selection, &mut self.rng)
    }

    /// Accept a recommended conflict, applying the lead-up insertion rule.
    pub fn accept(&self, selection: &mut SelectedElements, id: &str) -> Placement {
        RelatedConflictResolver::new(ConflictGraph::new(&self.data)).accept(selection, id)
    }

    pub fn random_selection(&mut self) -> SelectedElements {
        ElementSelector::new(&self.data).random_selection(&mut self.rng, &self.config.random)
    }

    pub fn compose(&self, selection: &SelectedElements) -> String {
        StoryComposer::new(&self.data).compose(selection)
    }

    pub fn compose_with_report(&self, selection: &SelectedElements) -> ComposedDraft {
        StoryComposer::new(&self.data).compose_with_report(selection)
    }

    pub fn diagnostics(&self) -> CorpusDiagnostics {
        ConflictGraph::new(&self.data).diagnostics()
    }
}

impl PlotEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Read the config from a RON file at build time.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Overrides the config's corpus path.
    pub fn corpus_path(mut self, path: impl AsRef<Path>) -> Self {
        self.corpus_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Overrides the config's seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Provide the corpus directly (for testing without files).
    pub fn with_corpus(mut self, data: PlottoData) -> Self {
        self.corpus = Some(data);
        self
    }

    pub fn build(self) -> Result<PlotEngine, EngineError> {
        let mut config = match self.config_path {
            Some(ref path) => EngineConfig::load_from_ron(path)?,
            None => self.config,
        };
        if let Some(path) = self.corpus_path {
            config.corpus_path = Some(path);
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        let (data, warnings) = match self.corpus {
            Some(data) => (data, Vec::new()),
            None => {
                let path = config
                    .corpus_path
                    .as_deref()
                    .ok_or(EngineError::MissingCorpus)?;
                let parsed = CorpusParser::load(path)?;
                (parsed.data, parsed.warnings)
            }
        };

        Ok(PlotEngine {
            data,
            warnings,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        })
    }
}
