//! # Topology Module
//!
//! Residue-level chemical knowledge needed by the hydrogen-bond engine: which
//! atoms donate or accept, their chemical classes, and the base atoms that
//! orient each acceptor.
//!
//! ## Key Components
//!
//! - [`registry`] - The chemistry registry, loaded from TOML and applied to a system
//!
//! ## Usage
//!
//! ```ignore
//! use hbscore::core::topology::registry::ChemistryRegistry;
//!
//! let registry = ChemistryRegistry::standard()?;
//! registry.apply(&mut system)?;
//! ```

pub mod registry;
