//! # Rotamers Module
//!
//! Alternative side-chain conformations of one residue position, as handed to
//! the packer. A [`set::RotamerSet`] owns its conformations and, once prepared
//! for packing, the hydrogen-bond trie built over them.
//!
//! ## Usage
//!
//! ```ignore
//! use hbscore::core::rotamers::set::RotamerSet;
//!
//! let site = system.residue(residue_id).unwrap();
//! let mut rotamers = RotamerSet::from_residues(residue_id, site, conformations);
//! method.prepare_rotamers_for_packing(&context, &mut rotamers)?;
//! ```

pub mod set;
