//! Hand-placed structures shared by the engine tests.
//!
//! Layout of [`backbone_pair`]: the donor glycine's N-H points along +x at the
//! acceptor glycine's C=O, with H···O = 1.9 Å and every angle linear. The
//! optional serine sits above the carbonyl so that its HG also reaches the
//! same oxygen (60° off the C=O axis) while its OG stays within reach of the
//! donor hydrogen.
//!
//! [`intra_serine`] puts that same side chain on the acceptor glycine's
//! backbone, so HG bonds to the residue's own O.

use crate::core::forcefield::params::HBondDatabase;
use crate::core::models::atom::Atom;
use crate::core::models::chain::ChainType;
use crate::core::models::ids::{ChainId, ResidueId};
use crate::core::models::residue::Residue;
use crate::core::models::system::MolecularSystem;
use crate::core::topology::registry::ChemistryRegistry;
use nalgebra::{Point3, Vector3};
use std::sync::Arc;

pub(crate) const DONOR_GLY: &[(&str, [f64; 3])] = &[
    ("N", [-1.01, 0.0, 0.0]),
    ("H", [0.0, 0.0, 0.0]),
    ("CA", [-1.8, 1.1, 0.0]),
    ("C", [-1.9, -1.3, 0.0]),
    ("O", [-2.5, -2.3, 0.0]),
];

pub(crate) const ACCEPTOR_GLY: &[(&str, [f64; 3])] = &[
    ("O", [1.9, 0.0, 0.0]),
    ("C", [3.13, 0.0, 0.0]),
    ("CA", [3.8, 1.2, 0.0]),
    ("N", [4.5, -1.2, 0.0]),
    ("H", [5.3, -1.7, 0.0]),
];

pub(crate) const SERINE: &[(&str, [f64; 3])] = &[
    ("CB", [0.47, 3.906, 0.0]),
    ("OG", [0.47, 2.476, 0.0]),
    ("HG", [0.95, 1.645, 0.0]),
];

pub(crate) fn database() -> Arc<HBondDatabase> {
    Arc::new(HBondDatabase::standard().unwrap())
}

pub(crate) fn add_residue(
    system: &mut MolecularSystem,
    chain: ChainId,
    number: isize,
    name: &str,
    atoms: &[(&str, [f64; 3])],
) -> ResidueId {
    let id = system.add_residue(chain, number, name, None).unwrap();
    for (atom_name, xyz) in atoms {
        system
            .add_atom_to_residue(id, Atom::new(atom_name, Point3::from(*xyz)))
            .unwrap();
    }
    id
}

/// Atoms of a far-away glycine, used to pad sequence separations.
pub(crate) fn filler_gly(offset: f64) -> Vec<(&'static str, [f64; 3])> {
    DONOR_GLY
        .iter()
        .map(|(name, [x, y, z])| (*name, [x + 100.0 + offset, y + 100.0, *z]))
        .collect()
}

pub(crate) fn finish(mut system: MolecularSystem) -> MolecularSystem {
    ChemistryRegistry::standard().unwrap().apply(&mut system).unwrap();
    system
}

pub(crate) struct BackbonePair {
    pub system: MolecularSystem,
    pub donor: ResidueId,
    pub acceptor: ResidueId,
    pub serine: Option<ResidueId>,
}

/// Donor glycine, then `gap` fillers, then the acceptor glycine (on chain B
/// when `same_chain` is false), then optionally a serine on chain S.
pub(crate) fn backbone_pair(gap: usize, same_chain: bool, with_serine: bool) -> BackbonePair {
    let mut system = MolecularSystem::new();
    let a = system.add_chain('A', ChainType::Protein);
    let donor = add_residue(&mut system, a, 1, "GLY", DONOR_GLY);
    for i in 0..gap {
        add_residue(&mut system, a, 2 + i as isize, "GLY", &filler_gly(10.0 * i as f64));
    }
    let acceptor_chain = if same_chain {
        a
    } else {
        system.add_chain('B', ChainType::Protein)
    };
    let acceptor = add_residue(
        &mut system,
        acceptor_chain,
        2 + gap as isize,
        "GLY",
        ACCEPTOR_GLY,
    );
    let serine = with_serine.then(|| {
        let s = system.add_chain('S', ChainType::Protein);
        add_residue(&mut system, s, 1, "SER", SERINE)
    });
    BackbonePair {
        system: finish(system),
        donor,
        acceptor,
        serine,
    }
}

/// Same atoms as [`backbone_pair`] without fillers, but with the acceptor
/// residue first in sequence order.
pub(crate) fn swapped_backbone_pair() -> BackbonePair {
    let mut system = MolecularSystem::new();
    let a = system.add_chain('A', ChainType::Protein);
    let acceptor = add_residue(&mut system, a, 1, "GLY", ACCEPTOR_GLY);
    let donor = add_residue(&mut system, a, 2, "GLY", DONOR_GLY);
    BackbonePair {
        system: finish(system),
        donor,
        acceptor,
        serine: None,
    }
}

pub(crate) const HYBRID_WATER: &[(&str, [f64; 3])] = &[
    ("OH2", [0.47, 6.9, 0.0]),
    ("H1", [0.47, 7.5, 0.55]),
    ("H2", [0.47, 7.5, -0.55]),
];

/// A single serine whose HG reaches its own backbone O, four bonds from OG
/// through CB, CA and C. With `with_water`, a hybrid water sits 3 Å from CB.
pub(crate) fn intra_serine(with_water: bool) -> (MolecularSystem, ResidueId) {
    let mut system = MolecularSystem::new();
    let a = system.add_chain('A', ChainType::Protein);
    let atoms: Vec<_> = ACCEPTOR_GLY.iter().chain(SERINE).copied().collect();
    let serine = add_residue(&mut system, a, 1, "SER", &atoms);
    let index = |system: &MolecularSystem, name| {
        system.residue(serine).unwrap().atom_index(name).unwrap()
    };
    for (x, y) in [("N", "CA"), ("CA", "C"), ("CA", "CB")] {
        let (i, j) = (index(&system, x), index(&system, y));
        system.add_bond(serine, i, j).unwrap();
    }
    if with_water {
        let w = system.add_chain('W', ChainType::Water);
        add_residue(&mut system, w, 1, "TP3", HYBRID_WATER);
    }
    (finish(system), serine)
}

pub(crate) fn translated(residue: &Residue, shift: Vector3<f64>) -> Residue {
    let mut moved = residue.clone();
    for i in 0..moved.atoms().len() {
        let p = *moved.position(i) + shift;
        moved.set_atom_position(i, p).unwrap();
    }
    moved
}
