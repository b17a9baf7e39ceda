pub mod centering;
pub mod error;
pub mod kernel;
pub mod sparsified;

pub use centering::KernelCenterer;
pub use error::{KernelError, SparseKernelError};
pub use kernel::KernelSpec;
pub use sparsified::{KernelMatrices, Sparsified};
