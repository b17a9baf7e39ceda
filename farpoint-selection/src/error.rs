/// Fatal failures of the selection layer.
///
/// Hitting the score threshold is not one of them: it commits a valid,
/// shorter-than-requested selection and is reported through
/// [`crate::FitReport`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum SelectionError {
    /// Returned before any state mutation when a parameter is out of range
    /// or options conflict.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Returned when a state-dependent call happens without a prior
    /// successful fit.
    #[error("selector has not been fitted")]
    NotFitted,
}
