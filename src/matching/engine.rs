use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::store::{CorpusEntry, CorpusIndex};
use crate::core::feature::FeatureSequence;
use crate::core::stroke::Stroke;
use crate::core::types::EntryId;
use crate::matching::assignment::{AssignmentSearch, DEFAULT_MAX_SEARCH_STEPS, N_NEIGHBORS};
use crate::matching::scoring::MatchScore;
use crate::matching::MatchError;
use crate::utils::validation::validate_features;

/// One ranked corpus entry
#[derive(Debug, Clone, Serialize)]
pub struct RankedMatch {
    /// Identifier of the matched entry
    pub id: EntryId,

    /// Description attached to the entry, if any
    pub description: Option<String>,

    /// Match score details
    pub score: MatchScore,
}

impl RankedMatch {
    fn new(entry: &CorpusEntry, score: MatchScore) -> Self {
        Self {
            id: entry.id.clone(),
            description: entry.description.clone(),
            score,
        }
    }
}

/// Configuration for the ranking engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Candidates each query stroke may pair with
    pub neighbors: usize,
    /// Slot placements allowed per comparison before giving up
    pub max_search_steps: usize,
    /// Score corpus entries on the rayon pool
    pub parallel: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            neighbors: N_NEIGHBORS,
            max_search_steps: DEFAULT_MAX_SEARCH_STEPS,
            parallel: true,
        }
    }
}

impl MatchingConfig {
    fn search(&self) -> AssignmentSearch {
        AssignmentSearch::new(self.neighbors, self.max_search_steps)
    }
}

/// Ranks a query sketch against every entry of a corpus
pub struct Ranker<'a> {
    corpus: &'a CorpusIndex,
    /// Configuration including neighbor count and search budget
    config: MatchingConfig,
}

impl<'a> Ranker<'a> {
    /// Create a new ranker with custom configuration
    pub fn new(corpus: &'a CorpusIndex, config: MatchingConfig) -> Self {
        Self { corpus, config }
    }

    #[must_use]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Score the query against every entry, in corpus load order
    ///
    /// # Errors
    ///
    /// Returns `MatchError::EmptyQuery` for a query without features,
    /// `MatchError::InvalidQuery` for an out-of-range coordinate, or
    /// `MatchError::SearchBudgetExceeded` if any comparison runs out of budget.
    pub fn score_all(&self, query: &FeatureSequence) -> Result<Vec<RankedMatch>, MatchError> {
        if query.is_empty() {
            return Err(MatchError::EmptyQuery);
        }
        validate_features(query.as_slice()).map_err(|e| MatchError::InvalidQuery(e.to_string()))?;

        let search = self.config.search();
        let score_entry = |entry: &CorpusEntry| -> Result<RankedMatch, MatchError> {
            let outcome = search.compare(query, &entry.features)?;
            debug!(id = %entry.id, score = outcome.score.value, "scored entry");
            Ok(RankedMatch::new(entry, outcome.score))
        };

        // Both paths collect in load order
        if self.config.parallel {
            self.corpus.entries().par_iter().map(score_entry).collect()
        } else {
            self.corpus.all_entries().map(score_entry).collect()
        }
    }

    /// Find the `k` entries with the lowest scores, best first.
    ///
    /// Ties keep corpus load order.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Ranker::score_all`].
    pub fn rank(&self, query: &FeatureSequence, k: usize) -> Result<Vec<RankedMatch>, MatchError> {
        if query.is_empty() {
            return Err(MatchError::EmptyQuery);
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut results = self.score_all(query)?;

        // Stable: equal scores stay in load order
        results.sort_by(|a, b| a.score.value.total_cmp(&b.score.value));
        results.truncate(k);
        Ok(results)
    }

    /// Extract features from raw strokes and rank them.
    ///
    /// # Errors
    ///
    /// Same as [`Ranker::rank`].
    pub fn rank_strokes(&self, strokes: &[Stroke], k: usize) -> Result<Vec<RankedMatch>, MatchError> {
        self.rank(&FeatureSequence::from_strokes(strokes), k)
    }
}
