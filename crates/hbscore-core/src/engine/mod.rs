//! # Engine Module
//!
//! This module implements the hydrogen-bond energy method: the per-round
//! bookkeeping that enforces the backbone/sidechain exclusion rule, the pair,
//! intra-residue and derivative evaluations built on it, and the trie-based
//! batch evaluation used during packing.
//!
//! ## Overview
//!
//! A scoring round starts with [`method::HBondEnergy::setup_for_scoring`],
//! which resolves the membrane and builds an [`hbond_set::HBondSet`] by
//! finding every backbone/backbone hydrogen bond first. All later
//! evaluations read that [`context::ScoringContext`] and never modify it, so
//! residue pairs can be scored in any order or in parallel.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Method switches, score weights and their TOML loading
//! - **Bond Bookkeeping** ([`hbond_set`]) - Neighbor counts, claimed backbone groups and helix segments
//! - **Scoring Context** ([`context`]) - Everything one round derives before pair evaluation
//! - **Energy Method** ([`method`]) - The [`method::EnergyMethod`] contract and its hydrogen-bond implementation
//! - **Caches** ([`cache`]) - Frozen minimization records and packing tries
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! ## Key Capabilities
//!
//! - **Exclusion bookkeeping** so that a claimed backbone group never also bonds to a sidechain
//! - **Environment, membrane and helix-length weighting** of raw bond energies
//! - **Analytic derivatives** accumulated per atom for gradient-based minimizers
//! - **Trie-vs-trie and trie-vs-path** batch energies for rotamer sets

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub(crate) mod evaluator;
pub mod hbond_set;
pub(crate) mod hbtrie;
pub mod method;
pub mod progress;

#[cfg(test)]
pub(crate) mod test_utils;
