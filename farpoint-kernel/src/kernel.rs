use farpoint_base::{perf_counters, types::Vector};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::KernelError;

/// Kernel menu of the sparse methods. `gamma = None` defaults to
/// `1 / n_features` at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kernel", rename_all = "lowercase")]
pub enum KernelSpec {
    Linear,
    Rbf {
        gamma: Option<f64>,
    },
    Polynomial {
        degree: u32,
        gamma: Option<f64>,
        coef0: f64,
    },
    Sigmoid {
        gamma: Option<f64>,
        coef0: f64,
    },
    /// The caller supplies the full kernel matrix as row vectors; there is
    /// nothing to evaluate.
    Precomputed,
}

impl KernelSpec {
    /// Pairwise kernel matrix between `x` and `y`, one rayon task per row
    /// slice. Fails for `Precomputed`, which has no closed form.
    pub fn gram(&self, x: &[Vector], y: &[Vector]) -> Result<Array2<f64>, KernelError> {
        if let KernelSpec::Precomputed = self {
            return Err(KernelError::InvalidParameter(
                "a precomputed kernel cannot be evaluated; pass the kernel matrix itself".into(),
            ));
        }
        let n = x.len();
        let m = y.len();
        let d = x.first().map(|v| v.dim()).unwrap_or(0);
        let gamma = self.gamma_or_default(d);

        let mut flat = vec![0.0; n * m];
        flat.par_chunks_mut(m.max(1))
            .zip(x.par_iter())
            .for_each(|(row, xi)| {
                for (out, yj) in row.iter_mut().zip(y.iter()) {
                    *out = self.eval(xi, yj, gamma);
                }
            });
        perf_counters::add_kernel_eval_count((n * m) as u64);
        Ok(Array2::from_shape_vec((n, m), flat).expect("row-major buffer matches the shape"))
    }

    fn gamma_or_default(&self, n_features: usize) -> f64 {
        let gamma = match *self {
            KernelSpec::Rbf { gamma }
            | KernelSpec::Polynomial { gamma, .. }
            | KernelSpec::Sigmoid { gamma, .. } => gamma,
            _ => None,
        };
        gamma.unwrap_or_else(|| {
            if n_features == 0 {
                1.0
            } else {
                1.0 / n_features as f64
            }
        })
    }

    fn eval(&self, a: &Vector, b: &Vector, gamma: f64) -> f64 {
        match *self {
            KernelSpec::Linear => a.inner_product(b),
            KernelSpec::Rbf { .. } => (-gamma * a.squared_distance(b)).exp(),
            KernelSpec::Polynomial { degree, coef0, .. } => {
                (gamma * a.inner_product(b) + coef0).powi(degree as i32)
            }
            KernelSpec::Sigmoid { coef0, .. } => (gamma * a.inner_product(b) + coef0).tanh(),
            KernelSpec::Precomputed => unreachable!("rejected in gram"),
        }
    }
}
