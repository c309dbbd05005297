//! # Rotamer Trie Module
//!
//! Prefix trees over rotamer atoms for batch energy evaluation. Rotamers of one
//! position usually share most of their atoms; the trie evaluates each shared
//! atom once and propagates partial sums down to the rotamers.
//!
//! ## Key Components
//!
//! - [`rotamer_trie`] - Descriptors and the generic [`rotamer_trie::RotamerTrie`]
//! - [`traversal`] - Trie-vs-trie and trie-vs-path energy tables with distance pruning
//! - [`hbond`] - Hydrogen-bond atom payload and the backbone/sidechain count-pair rule

pub mod hbond;
pub mod rotamer_trie;
pub mod traversal;
