use crate::{error::SelectionError, Selector, TargetSize};
use rand::prelude::*;
use rand_xorshift::XorShiftRng;

/// Baseline selector: a seeded uniform sample of the candidates, in draw
/// order. Deterministic for a given seed.
pub struct RandomSelection {
    pub seed: u64,
}

impl RandomSelection {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl<V> Selector<V> for RandomSelection {
    fn name(&self) -> String {
        String::from("Random")
    }

    fn select(&mut self, data: &[V], n_to_select: TargetSize) -> Result<Vec<usize>, SelectionError> {
        if data.len() < 2 {
            return Err(SelectionError::InvalidParameter(format!(
                "selection needs at least 2 candidates, got {}",
                data.len()
            )));
        }
        let target = n_to_select.resolve(data.len())?;
        let mut rng = XorShiftRng::seed_from_u64(self.seed);
        let mut indices: Vec<usize> = (0..data.len()).collect();
        indices.shuffle(&mut rng);
        indices.truncate(target);
        Ok(indices)
    }
}
