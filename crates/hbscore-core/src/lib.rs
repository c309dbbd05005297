//! # hbscore
//!
//! A knowledge-based hydrogen-bond energy for macromolecular structures,
//! with the backbone bookkeeping, derivatives and batch evaluation a
//! structure-modeling pipeline needs.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`,
//!   `Residue`), the residue chemistry that types donors and acceptors, the
//!   polynomial parameter database and the geometric energy function, plus
//!   the generic rotamer trie and its traversals.
//!
//! - **[`engine`]: The Logic Core.** The hydrogen-bond energy method itself:
//!   the per-round `HBondSet` that claims backbone groups, pair and
//!   intra-residue energies, derivatives for minimization and trie-based
//!   energies for packing.
//!
//! - **[`workflows`]: The Public API.** Complete procedures, such as scoring a
//!   structure or ranking conformations at one site, built on the two layers
//!   below.

pub mod core;
pub mod engine;
pub mod workflows;
