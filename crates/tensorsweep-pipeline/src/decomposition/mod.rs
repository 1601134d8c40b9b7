//! Tensor decomposition routines behind the `Decomposer` trait.

mod linalg;
pub mod sparse_cp;

pub use sparse_cp::SparseCp;
