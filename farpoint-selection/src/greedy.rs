use crate::{error::SelectionError, TargetSize};
use farpoint_base::progress::report_progress;
use log::warn;
use rayon::prelude::*;

/// The pluggable scoring contract of the greedy engine.
///
/// A scorer owns whatever incremental state it needs; the engine owns
/// eligibility and the selection buffers.
pub trait Scorer<V> {
    /// One-time setup for a fresh search over `data`. May mandate the
    /// initial pick, which the engine records through the standard
    /// post-selection path before the main loop starts.
    ///
    /// Runs before the engine touches any of its own state, so a failure
    /// leaves a previously fitted instance observable.
    fn init(
        &mut self,
        data: &[V],
        targets: Option<&[f64]>,
    ) -> Result<Option<usize>, SelectionError>;

    /// Current per-candidate scores over the full candidate set. The engine
    /// restricts to eligible candidates itself.
    fn scores(&self) -> &[f64];

    /// Incorporate the candidate that was just selected.
    fn update(&mut self, data: &[V], selected: usize);
}

/// Outcome of a `fit` call. `n_selected < requested` exactly when the score
/// threshold cut the search short; the shortened selection is still valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitReport {
    pub requested: usize,
    pub n_selected: usize,
    pub threshold_reached: bool,
}

struct SearchState<V> {
    n_candidates: usize,
    eligible: Vec<bool>,
    selected: Vec<V>,
    selected_idx: Vec<usize>,
    support: Vec<bool>,
}

/// Generic greedy forward selection: repeatedly pick the eligible candidate
/// maximizing the scorer's current score, never reconsidering past picks.
///
/// Selection state survives between calls, so a later `fit` with
/// `warm_start = true` and a larger target continues the same trajectory,
/// appending to the earlier picks without revisiting them.
pub struct GreedySelector<V, S> {
    pub(crate) scorer: S,
    pub(crate) score_threshold: Option<f64>,
    pub(crate) full: bool,
    pub(crate) progress_bar: bool,
    state: Option<SearchState<V>>,
}

impl<V, S> GreedySelector<V, S> {
    pub fn new(scorer: S) -> Self {
        Self {
            scorer,
            score_threshold: None,
            full: false,
            progress_bar: false,
            state: None,
        }
    }

    /// Stop selecting once the best remaining score falls below `threshold`.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    /// Keep selecting past score exhaustion, lowest index first among equal
    /// scores. Conflicts with `with_threshold`.
    pub fn full(mut self) -> Self {
        self.full = true;
        self
    }

    pub fn with_progress(mut self) -> Self {
        self.progress_bar = true;
        self
    }

    pub fn n_selected(&self) -> usize {
        self.state.as_ref().map(|s| s.selected_idx.len()).unwrap_or(0)
    }

    /// Indices chosen so far, in selection order.
    pub fn selected_indices(&self) -> Result<&[usize], SelectionError> {
        self.state
            .as_ref()
            .map(|s| s.selected_idx.as_slice())
            .ok_or(SelectionError::NotFitted)
    }

    /// The candidates corresponding to `selected_indices`, cached in
    /// selection order.
    pub fn selected_data(&self) -> Result<&[V], SelectionError> {
        self.state
            .as_ref()
            .map(|s| s.selected.as_slice())
            .ok_or(SelectionError::NotFitted)
    }

    /// The mask of selected candidates: the complement of eligibility at
    /// termination.
    pub fn support_mask(&self) -> Result<&[bool], SelectionError> {
        self.state
            .as_ref()
            .map(|s| s.support.as_slice())
            .ok_or(SelectionError::NotFitted)
    }

    pub(crate) fn scorer(&self) -> &S {
        &self.scorer
    }
}

impl<V: Clone + Sync, S: Scorer<V>> GreedySelector<V, S> {
    /// Run (or continue) the greedy search until `n_to_select` candidates
    /// are chosen or the score threshold is crossed.
    ///
    /// All fatal errors are raised before any state mutation; a previously
    /// fitted instance stays intact through a failed call.
    pub fn fit(
        &mut self,
        data: &[V],
        targets: Option<&[f64]>,
        n_to_select: TargetSize,
        warm_start: bool,
    ) -> Result<FitReport, SelectionError> {
        let n = data.len();
        if n < 2 {
            return Err(SelectionError::InvalidParameter(format!(
                "selection needs at least 2 candidates, got {}",
                n
            )));
        }
        if let Some(targets) = targets {
            if targets.len() != n {
                return Err(SelectionError::InvalidParameter(format!(
                    "targets length {} does not match {} candidates",
                    targets.len(),
                    n
                )));
            }
        }
        if self.full && self.score_threshold.is_some() {
            return Err(SelectionError::InvalidParameter(
                "cannot combine a score threshold with full selection".into(),
            ));
        }
        let target = n_to_select.resolve(n)?;

        if warm_start {
            let state = self.state.as_mut().ok_or(SelectionError::NotFitted)?;
            if state.n_candidates != n {
                return Err(SelectionError::InvalidParameter(format!(
                    "warm start requires the same data: fitted on {} candidates, got {}",
                    state.n_candidates, n
                )));
            }
            let already = state.selected_idx.len();
            if target < already {
                return Err(SelectionError::InvalidParameter(format!(
                    "warm start target {} is below the {} candidates already selected",
                    target, already
                )));
            }
            state.selected.reserve_exact(target - already);
            state.selected_idx.reserve_exact(target - already);
        } else {
            let first = self.scorer.init(data, targets)?;
            let mut state = SearchState {
                n_candidates: n,
                eligible: vec![true; n],
                selected: Vec::with_capacity(target),
                selected_idx: Vec::with_capacity(target),
                support: Vec::new(),
            };
            if let Some(first) = first {
                record_selection(&mut state, &mut self.scorer, data, first);
            }
            self.state = Some(state);
        }

        let state = self.state.as_mut().expect("state initialized above");
        let scorer = &mut self.scorer;
        let remaining = target - state.selected_idx.len();
        let mut threshold_reached = false;
        for _ in report_progress(0..remaining, self.progress_bar) {
            match best_eligible(scorer.scores(), &state.eligible) {
                Some((idx, score)) => {
                    if let Some(threshold) = self.score_threshold {
                        if score < threshold {
                            warn!(
                                "score threshold {} reached: selected {} of {} requested",
                                threshold,
                                state.selected_idx.len(),
                                target
                            );
                            threshold_reached = true;
                            break;
                        }
                    }
                    record_selection(state, scorer, data, idx);
                }
                // no eligible candidate left
                None => break,
            }
        }

        state.support = state.eligible.iter().map(|e| !e).collect();
        Ok(FitReport {
            requested: target,
            n_selected: state.selected_idx.len(),
            threshold_reached,
        })
    }
}

fn record_selection<V: Clone, S: Scorer<V>>(
    state: &mut SearchState<V>,
    scorer: &mut S,
    data: &[V],
    idx: usize,
) {
    state.selected.push(data[idx].clone());
    state.selected_idx.push(idx);
    state.eligible[idx] = false;
    scorer.update(data, idx);
}

/// Find the eligible candidate with the maximum score. Ties break to the
/// lowest index through the secondary comparison, so the parallel reduction
/// order cannot change the winner.
fn best_eligible(scores: &[f64], eligible: &[bool]) -> Option<(usize, f64)> {
    scores
        .par_iter()
        .zip(eligible.par_iter())
        .enumerate()
        .filter(|(_, (_, &eligible))| eligible)
        .map(|(i, (&score, _))| (i, score))
        .reduce_with(|a, b| {
            if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) {
                b
            } else {
                a
            }
        })
}
