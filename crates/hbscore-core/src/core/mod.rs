//! # Core Module
//!
//! The stateless foundation of hbscore: the structure model, hydrogen-bond
//! chemistry, the parameter database and the pure geometric energy, plus the
//! rotamer tries used for batch evaluation.
//!
//! ## Architecture
//!
//! - **Structure Representation** ([`models`]) - Atoms, residues, chains, the system and its membrane
//! - **Chemistry** ([`topology`]) - Registry assigning donor/acceptor types, bases and roles
//! - **Hydrogen-Bond Physics** ([`forcefield`]) - Evaluation tuples, parameters, energy, derivatives and weights
//! - **File I/O** ([`io`]) - BGF structure reading
//! - **Rotamers** ([`rotamers`]) - Alternative conformations of one position
//! - **Tries** ([`trie`]) - Prefix trees over rotamer atoms and their traversals
//! - **Utilities** ([`utils`]) - Geometry helpers and atom-name classification
//!
//! Nothing in this module holds per-round state; everything a scoring round
//! derives from the structure lives in [`crate::engine`].

pub mod forcefield;
pub mod io;
pub mod models;
pub mod rotamers;
pub mod topology;
pub mod trie;
pub mod utils;
