use farpoint_base::types::Vector;
use farpoint_selection::{Selector, TargetSize};
use log::debug;
use ndarray::Array2;

use crate::{
    centering::KernelCenterer,
    error::{KernelError, SparseKernelError},
    kernel::KernelSpec,
};

/// The kernel matrices a sparse kernel method trains on: the active-set
/// kernel (m x m) and the cross kernel between the full set and the active
/// set (n x m).
#[derive(Debug, Clone)]
pub struct KernelMatrices {
    pub active: Array2<f64>,
    pub cross: Array2<f64>,
}

/// Driver shared by the sparse kernel methods: obtains an active set from
/// its selector, then computes (and optionally centers) the kernel
/// submatrices a downstream model consumes.
pub struct Sparsified<S> {
    spec: KernelSpec,
    n_active: TargetSize,
    center: bool,
    selector: S,
    active_idx: Option<Vec<usize>>,
    centerer: Option<KernelCenterer>,
}

impl<S: Selector<Vector>> Sparsified<S> {
    pub fn new(spec: KernelSpec, n_active: TargetSize, selector: S) -> Self {
        Self {
            spec,
            n_active,
            center: true,
            selector,
            active_idx: None,
            centerer: None,
        }
    }

    /// Leave the kernel matrices uncentered.
    pub fn without_centering(mut self) -> Self {
        self.center = false;
        self
    }

    /// Select the active set and compute the kernel submatrices.
    ///
    /// The active set may come out smaller than requested when the selector
    /// stops at its score threshold; the matrices follow the achieved size.
    pub fn fit(&mut self, x: &[Vector]) -> Result<KernelMatrices, SparseKernelError> {
        let idx = self.selector.select(x, self.n_active)?;
        debug!(
            "{} selected {} active candidates out of {}",
            self.selector.name(),
            idx.len(),
            x.len()
        );

        let (mut active, mut cross) = match self.spec {
            KernelSpec::Precomputed => sliced_precomputed(x, &idx)?,
            _ => {
                let x_active: Vec<Vector> = idx.iter().map(|&i| x[i].clone()).collect();
                let active = self.spec.gram(&x_active, &x_active)?;
                let cross = self.spec.gram(x, &x_active)?;
                (active, cross)
            }
        };

        if self.center {
            let mut centerer = KernelCenterer::new();
            centerer.fit(&active)?;
            active = centerer.transform(&active)?;
            cross = centerer.transform(&cross)?;
            self.centerer = Some(centerer);
        } else {
            self.centerer = None;
        }

        self.active_idx = Some(idx);
        Ok(KernelMatrices { active, cross })
    }

    /// Indices of the active set, in selection order.
    pub fn active_set(&self) -> Result<&[usize], SparseKernelError> {
        self.active_idx
            .as_deref()
            .ok_or(SparseKernelError::NotFitted)
    }

    /// The centerer fitted on the active-set kernel, for transforming
    /// out-of-sample kernel rows consistently.
    pub fn centerer(&self) -> Option<&KernelCenterer> {
        self.centerer.as_ref()
    }
}

/// For a precomputed kernel the rows of `x` are the caller's full kernel
/// matrix; validate it is square and slice out the active submatrices.
fn sliced_precomputed(
    rows: &[Vector],
    idx: &[usize],
) -> Result<(Array2<f64>, Array2<f64>), SparseKernelError> {
    let n = rows.len();
    for row in rows {
        if row.dim() != n {
            return Err(KernelError::ShapeMismatch {
                expected: n,
                got: row.dim(),
            }
            .into());
        }
    }
    let m = idx.len();
    let mut active = Array2::zeros((m, m));
    for (a, &i) in idx.iter().enumerate() {
        let row = rows[i].as_slice();
        for (b, &j) in idx.iter().enumerate() {
            active[[a, b]] = row[j];
        }
    }
    let mut cross = Array2::zeros((n, m));
    for (a, row) in rows.iter().enumerate() {
        let row = row.as_slice();
        for (b, &j) in idx.iter().enumerate() {
            cross[[a, b]] = row[j];
        }
    }
    Ok((active, cross))
}
