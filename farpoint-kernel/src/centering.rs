use ndarray::{Array1, Array2, Axis};

use crate::error::KernelError;

/// Centers kernel matrices in feature space.
///
/// Fitted once per active set on the square active-set kernel; `transform`
/// then centers both the square matrix and the rectangular cross matrices
/// consistently, so downstream models see a zero-mean feature map.
#[derive(Debug, Default)]
pub struct KernelCenterer {
    fitted: Option<Fitted>,
}

#[derive(Debug)]
struct Fitted {
    col_means: Array1<f64>,
    grand_mean: f64,
}

impl KernelCenterer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, kernel: &Array2<f64>) -> Result<(), KernelError> {
        let (rows, cols) = kernel.dim();
        if rows == 0 || cols == 0 {
            return Err(KernelError::InvalidParameter(
                "cannot center an empty kernel matrix".into(),
            ));
        }
        if rows != cols {
            return Err(KernelError::ShapeMismatch {
                expected: rows,
                got: cols,
            });
        }
        let col_means = kernel.mean_axis(Axis(0)).expect("kernel is non-empty");
        let grand_mean = col_means.mean().expect("kernel is non-empty");
        self.fitted = Some(Fitted {
            col_means,
            grand_mean,
        });
        Ok(())
    }

    /// Center a kernel matrix whose columns index the fitted active set:
    /// `K'[i, j] = K[i, j] - mean_j(K[i, .]) - mean_i(Kfit[., j]) + mean(Kfit)`.
    pub fn transform(&self, kernel: &Array2<f64>) -> Result<Array2<f64>, KernelError> {
        let fitted = self.fitted.as_ref().ok_or(KernelError::NotFitted)?;
        let m = fitted.col_means.len();
        if kernel.ncols() != m {
            return Err(KernelError::ShapeMismatch {
                expected: m,
                got: kernel.ncols(),
            });
        }
        let row_means = kernel.mean_axis(Axis(1)).expect("fitted size is nonzero");
        let mut out = kernel.to_owned();
        out -= &row_means.insert_axis(Axis(1));
        out -= &fitted.col_means;
        out += fitted.grand_mean;
        Ok(out)
    }
}
