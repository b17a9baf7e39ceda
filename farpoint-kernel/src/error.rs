use farpoint_selection::SelectionError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    /// Returned when a matrix's trailing dimension does not match what the
    /// fitted state expects.
    #[error("shape mismatch: expected trailing dimension {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// Returned when transform is called before fit.
    #[error("kernel centerer has not been fitted")]
    NotFitted,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Errors of the sparse-kernel-method layer: its own kernel failures plus
/// selection failures propagated unchanged.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SparseKernelError {
    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Returned when state-dependent accessors run before a successful fit.
    #[error("sparse kernel method has not been fitted")]
    NotFitted,
}
