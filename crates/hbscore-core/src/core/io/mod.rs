//! Provides input functionality for molecular file formats.
//!
//! Structures are read into a [`MolecularSystem`](crate::core::models::system::MolecularSystem)
//! through a trait-based interface; hydrogen-bond chemistry is assigned afterwards by the
//! chemistry registry.

pub mod bgf;
pub mod traits;
