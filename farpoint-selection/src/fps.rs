use crate::{
    error::SelectionError,
    greedy::{FitReport, GreedySelector, Scorer},
    Selector, TargetSize,
};
use farpoint_base::{perf_counters, types::InnerProduct};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;

/// Squared distances below this tolerance count as zero: the candidate is
/// numerically coincident with an already selected point.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// Choice of the first selected point.
#[derive(Debug, Clone, Copy)]
pub enum Initialize {
    /// Fix the first pick.
    Index(usize),
    /// Draw the first pick uniformly, reproducibly from the given seed.
    Random { seed: u64 },
}

/// Scorer implementing the farthest-point rule: a candidate's score is its
/// squared distance to the nearest already selected point, maintained
/// incrementally through the Gram identity
/// `d^2(i, p) = |i|^2 + |p|^2 - 2<i, p>`.
///
/// Scores and the threshold are squared distances; the public accessors on
/// [`FarthestPointSampling`] convert to Euclidean values.
pub struct FpsScorer {
    initialize: Initialize,
    norms: Vec<f64>,
    min_sq_dist: Vec<f64>,
    sq_dist_at_select: Vec<f64>,
}

impl FpsScorer {
    fn new(initialize: Initialize) -> Self {
        Self {
            initialize,
            norms: Vec::new(),
            min_sq_dist: Vec::new(),
            sq_dist_at_select: Vec::new(),
        }
    }
}

impl<V: InnerProduct + Sync> Scorer<V> for FpsScorer {
    fn init(
        &mut self,
        data: &[V],
        _targets: Option<&[f64]>,
    ) -> Result<Option<usize>, SelectionError> {
        let n = data.len();
        let first = match self.initialize {
            Initialize::Index(i) => {
                if i >= n {
                    return Err(SelectionError::InvalidParameter(format!(
                        "initial index {} is out of range for {} candidates",
                        i, n
                    )));
                }
                i
            }
            Initialize::Random { seed } => XorShiftRng::seed_from_u64(seed).gen_range(0..n),
        };
        self.norms = data.iter().map(|v| v.squared_norm()).collect();
        self.min_sq_dist = vec![f64::INFINITY; n];
        self.sq_dist_at_select = vec![f64::INFINITY; n];
        Ok(Some(first))
    }

    fn scores(&self) -> &[f64] {
        &self.min_sq_dist
    }

    fn update(&mut self, data: &[V], selected: usize) {
        // the coverage radius achieved at the moment of selection, kept for
        // diagnostics before the entry collapses to zero
        self.sq_dist_at_select[selected] = self.min_sq_dist[selected];
        self.min_sq_dist[selected] = 0.0;

        let pivot = &data[selected];
        let pivot_norm = self.norms[selected];
        let norms = &self.norms;
        self.min_sq_dist
            .par_iter_mut()
            .zip(data.par_iter())
            .zip(norms.par_iter())
            .for_each(|((min_sq, v), &norm)| {
                let sq = (norm + pivot_norm - 2.0 * v.inner_product(pivot)).max(0.0);
                debug_assert!(sq.is_finite());
                if sq < *min_sq {
                    *min_sq = sq;
                }
            });
        perf_counters::add_distance_count(data.len() as u64);
    }
}

/// Greedy selection of the point farthest from everything already chosen: a
/// greedy approximation to the k-center covering problem.
///
/// Selection state persists across calls, so a later `fit` with
/// `warm_start = true` and a larger target continues the same trajectory.
/// With the default tolerance the search halts on its own once every
/// remaining candidate is (numerically) a duplicate of a selected one.
pub struct FarthestPointSampling<V> {
    greedy: GreedySelector<V, FpsScorer>,
}

impl<V: InnerProduct + Clone + Sync> FarthestPointSampling<V> {
    pub fn new(initialize: Initialize) -> Self {
        Self {
            greedy: GreedySelector::new(FpsScorer::new(initialize))
                .with_threshold(DEFAULT_TOLERANCE),
        }
    }

    /// Squared-distance tolerance under which a candidate counts as covered.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.greedy.score_threshold = Some(tolerance);
        self
    }

    /// Keep selecting even among candidates at zero distance from the
    /// selected set (duplicates), lowest index first.
    pub fn full(mut self) -> Self {
        self.greedy.score_threshold = None;
        self.greedy.full = true;
        self
    }

    pub fn with_progress(mut self) -> Self {
        self.greedy.progress_bar = true;
        self
    }

    pub fn fit(
        &mut self,
        data: &[V],
        targets: Option<&[f64]>,
        n_to_select: TargetSize,
        warm_start: bool,
    ) -> Result<FitReport, SelectionError> {
        self.greedy.fit(data, targets, n_to_select, warm_start)
    }

    pub fn n_selected(&self) -> usize {
        self.greedy.n_selected()
    }

    pub fn selected_indices(&self) -> Result<&[usize], SelectionError> {
        self.greedy.selected_indices()
    }

    pub fn selected_data(&self) -> Result<&[V], SelectionError> {
        self.greedy.selected_data()
    }

    pub fn support_mask(&self) -> Result<&[bool], SelectionError> {
        self.greedy.support_mask()
    }

    /// Coverage radii achieved at each selection, in selection order. The
    /// first pick carries an infinity sentinel: nothing was selected before
    /// it.
    pub fn selection_distances(&self) -> Result<Vec<f64>, SelectionError> {
        let idx = self.greedy.selected_indices()?;
        let scorer = self.greedy.scorer();
        Ok(idx
            .iter()
            .map(|&i| scorer.sq_dist_at_select[i].sqrt())
            .collect())
    }

    /// Current minimum Euclidean distance from every candidate to the
    /// selected set. Zero exactly at the selected candidates.
    pub fn hausdorff_distances(&self) -> Result<Vec<f64>, SelectionError> {
        self.greedy.selected_indices()?;
        Ok(self
            .greedy
            .scorer()
            .min_sq_dist
            .iter()
            .map(|d| d.sqrt())
            .collect())
    }
}

impl<V: InnerProduct + Clone + Sync> Selector<V> for FarthestPointSampling<V> {
    fn name(&self) -> String {
        String::from("FPS")
    }

    fn select(&mut self, data: &[V], n_to_select: TargetSize) -> Result<Vec<usize>, SelectionError> {
        self.fit(data, None, n_to_select, false)?;
        Ok(self.selected_indices()?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farpoint_base::types::Vector;

    fn line_points() -> Vec<Vector> {
        vec![
            Vector::new(vec![0.0]),
            Vector::new(vec![1.0]),
            Vector::new(vec![5.0]),
            Vector::new(vec![6.0]),
        ]
    }

    #[test]
    fn farthest_second_pick_on_the_line() {
        let data = line_points();
        let mut fps = FarthestPointSampling::new(Initialize::Index(0));
        let report = fps.fit(&data, None, TargetSize::Count(2), false).unwrap();
        assert_eq!(report.n_selected, 2);
        assert_eq!(fps.selected_indices().unwrap(), &[0, 3]);
        assert_eq!(fps.support_mask().unwrap(), &[true, false, false, true]);
        let dists = fps.selection_distances().unwrap();
        assert!(dists[0].is_infinite());
        assert!((dists[1] - 6.0).abs() < 1e-12);
        let cached = fps.selected_data().unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[1].as_slice(), &[6.0]);
    }

    #[test]
    fn tolerance_halts_before_target() {
        let data = line_points();
        let mut fps = FarthestPointSampling::new(Initialize::Index(0)).with_tolerance(10.0);
        let report = fps
            .fit(&data, None, TargetSize::Fraction(1.0), false)
            .unwrap();
        assert!(report.threshold_reached);
        assert_eq!(report.requested, 4);
        assert_eq!(report.n_selected, 2);
        assert_eq!(fps.selected_indices().unwrap(), &[0, 3]);
    }

    #[test]
    fn selecting_everything_zeroes_the_distances() {
        let data = line_points();
        let mut fps = FarthestPointSampling::new(Initialize::Index(0));
        let report = fps
            .fit(&data, None, TargetSize::Fraction(1.0), false)
            .unwrap();
        assert_eq!(report.n_selected, 4);
        for d in fps.hausdorff_distances().unwrap() {
            assert_eq!(d, 0.0);
        }
    }

    #[test]
    fn warm_start_matches_direct_fit() {
        let data: Vec<Vector> = (0..12)
            .map(|i| {
                let x = (i as f64 * 0.7).sin() * 3.0;
                let y = (i as f64 * 1.3).cos() * 2.0;
                Vector::new(vec![x, y])
            })
            .collect();

        let mut direct = FarthestPointSampling::new(Initialize::Index(0));
        direct.fit(&data, None, TargetSize::Count(7), false).unwrap();

        let mut warm = FarthestPointSampling::new(Initialize::Index(0));
        warm.fit(&data, None, TargetSize::Count(3), false).unwrap();
        let before: Vec<usize> = warm.selected_indices().unwrap().to_vec();
        warm.fit(&data, None, TargetSize::Count(7), true).unwrap();

        assert_eq!(&warm.selected_indices().unwrap()[..3], &before[..]);
        assert_eq!(
            direct.selected_indices().unwrap(),
            warm.selected_indices().unwrap()
        );
    }

    #[test]
    fn min_distances_never_increase() {
        let data: Vec<Vector> = (0..10)
            .map(|i| Vector::new(vec![(i as f64 * 2.1).sin(), (i as f64 * 0.9).cos()]))
            .collect();
        let mut fps = FarthestPointSampling::new(Initialize::Index(0));
        fps.fit(&data, None, TargetSize::Count(1), false).unwrap();
        let mut previous = fps.hausdorff_distances().unwrap();
        for k in 2..=9 {
            fps.fit(&data, None, TargetSize::Count(k), true).unwrap();
            let current = fps.hausdorff_distances().unwrap();
            for (c, p) in current.iter().zip(previous.iter()) {
                assert!(c <= p);
            }
            previous = current;
        }
    }

    #[test]
    fn coverage_radii_never_increase() {
        let data: Vec<Vector> = (0..15)
            .map(|i| {
                Vector::new(vec![(i as f64 * 1.7).sin() * 4.0, (i as f64 * 0.3).cos()])
            })
            .collect();
        let mut fps = FarthestPointSampling::new(Initialize::Index(2));
        fps.fit(&data, None, TargetSize::Count(10), false).unwrap();
        let radii = fps.selection_distances().unwrap();
        for pair in radii[1..].windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn random_initialization_is_reproducible() {
        let data = line_points();
        let pick = |seed| {
            let mut fps = FarthestPointSampling::new(Initialize::Random { seed });
            fps.fit(&data, None, TargetSize::Count(2), false).unwrap();
            fps.selected_indices().unwrap().to_vec()
        };
        assert_eq!(pick(42), pick(42));
    }

    #[test]
    fn duplicates_stop_the_search() {
        let _ = env_logger::builder().is_test(true).try_init();
        let data = vec![
            Vector::new(vec![0.0, 0.0]),
            Vector::new(vec![0.0, 0.0]),
            Vector::new(vec![3.0, 4.0]),
            Vector::new(vec![3.0, 4.0]),
        ];
        let mut fps = FarthestPointSampling::new(Initialize::Index(0));
        let report = fps.fit(&data, None, TargetSize::Count(3), false).unwrap();
        assert!(report.threshold_reached);
        assert_eq!(report.n_selected, 2);
        assert_eq!(fps.selected_indices().unwrap(), &[0, 2]);
    }

    #[test]
    fn full_selection_keeps_going_past_duplicates() {
        let data = vec![
            Vector::new(vec![0.0]),
            Vector::new(vec![0.0]),
            Vector::new(vec![2.0]),
        ];
        let mut fps = FarthestPointSampling::new(Initialize::Index(0)).full();
        let report = fps
            .fit(&data, None, TargetSize::Fraction(1.0), false)
            .unwrap();
        assert!(!report.threshold_reached);
        assert_eq!(report.n_selected, 3);
        assert_eq!(fps.selected_indices().unwrap(), &[0, 2, 1]);
    }

    #[test]
    fn out_of_range_initialization_is_rejected() {
        let data = line_points();
        let mut fps = FarthestPointSampling::new(Initialize::Index(9));
        let err = fps.fit(&data, None, TargetSize::Count(2), false).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidParameter(_)));
        assert!(matches!(fps.support_mask(), Err(SelectionError::NotFitted)));
    }

    #[test]
    fn distance_counter_advances() {
        let data = line_points();
        farpoint_base::perf_counters::distance_count();
        let mut fps = FarthestPointSampling::new(Initialize::Index(0));
        fps.fit(&data, None, TargetSize::Count(2), false).unwrap();
        assert!(farpoint_base::perf_counters::distance_count() >= 8);
    }
}
