//! # Core Models Module
//!
//! Data structures describing the structure being scored: residues that own their
//! atoms (with hydrogen-bond chemistry attached), chains, the system that orders
//! residues into sequence positions, and the optional implicit membrane.
//!
//! ## Key Components
//!
//! - [`atom`] - Atoms with role, coordinates, donor/acceptor chemistry and base atoms
//! - [`residue`] - Residues with cached polar-hydrogen/acceptor lists and bounding sphere
//! - [`chain`] - Chain metadata and polymer classification
//! - [`system`] - The complete structure with sequence positions
//! - [`membrane`] - Implicit membrane geometry
//! - [`builder`] - Incremental construction from file records
//! - [`ids`] - Unique identifier types for residues and chains
//!
//! ## Usage
//!
//! ```ignore
//! use hbscore::core::models::{atom::Atom, chain::ChainType, system::MolecularSystem};
//!
//! let mut system = MolecularSystem::new();
//! let chain_id = system.add_chain('A', ChainType::Protein);
//! let residue_id = system.add_residue(chain_id, 1, "SER", None).unwrap();
//! system.add_atom_to_residue(residue_id, Atom::new("OG", Point3::new(0.0, 0.0, 0.0)));
//! ```

pub mod atom;
pub mod builder;
pub mod chain;
pub mod ids;
pub mod membrane;
pub mod residue;
pub mod system;
