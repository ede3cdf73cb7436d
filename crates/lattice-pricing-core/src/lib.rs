pub mod error;
pub mod math;
pub mod types;

#[cfg(feature = "lattice")]
pub mod lattice;

pub use error::LatticeError;
pub use types::*;

/// Standard result type for all lattice-pricing operations
pub type LatticeResult<T> = Result<T, LatticeError>;
