//! Scalar numerical building blocks of the flash solvers.
mod cubic;
mod ridder;

pub use cubic::cubic_min_max_roots;
pub use ridder::{ridder, RootEstimate};
