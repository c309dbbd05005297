//! # Force Field Module
//!
//! Stateless hydrogen-bond physics: chemical classification of donors and
//! acceptors, the parameter database, the polynomial geometric energy with its
//! analytic gradient, and the environment, membrane and helix-length weights.
//!
//! ## Key Components
//!
//! - [`types`] - Donor/acceptor chemistry, sequence separation and evaluation tuples
//! - [`params`] - The [`params::HBondDatabase`] loaded from CSV tables
//! - [`energy`] - Raw energy and gradient of a single donor/acceptor geometry
//! - [`weights`] - Burial, membrane-depth and helix-length reweighting
//! - [`term`] - Score terms and the [`term::EnergyMap`] accumulator
//! - [`deriv`] - Per-atom derivative vectors and slot assignment
//!
//! ## Usage
//!
//! ```ignore
//! use hbscore::core::forcefield::{energy, params::HBondDatabase, types::*};
//!
//! let database = HBondDatabase::standard()?;
//! let tuple = HBEvalTuple::classify(HBDonChemType::Pba, true, HBAccChemType::Pba, true, 4, true);
//! let raw = energy::hb_energy(&database, &tuple, &geometry);
//! ```

pub mod deriv;
pub mod energy;
pub mod params;
pub(crate) mod potentials;
pub mod term;
pub mod types;
pub mod weights;
