//! # Workflows Module
//!
//! High-level entry points that run the hydrogen-bond energy method over a
//! whole structure.
//!
//! ## Overview
//!
//! Each workflow sets up a scoring round, fans the residue-level work out
//! (in parallel with the `parallel` feature), reports progress through a
//! [`crate::engine::progress::ProgressReporter`] and gathers the results into
//! a plain report struct.
//!
//! ## Architecture
//!
//! - **Scoring Workflow** ([`score`]) - Total and per-pair energies, optionally with atom derivatives
//! - **Rotamer Workflow** ([`rotamers`]) - Trie-based energies of candidate conformations at one site

pub mod rotamers;
pub mod score;
