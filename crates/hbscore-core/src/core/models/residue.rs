use super::atom::Atom;
use super::chain::ChainType;
use super::ids::ChainId;
use crate::core::utils::identifiers::{
    HYBRID_WATER_RESIDUE_NAME, is_water_residue, representative_atom_name,
};
use nalgebra::Point3;
use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueType {
    // --- Aliphatic, Nonpolar ---
    Alanine,    // Alanine (ALA)
    Glycine,    // Glycine (GLY)
    Isoleucine, // Isoleucine (ILE)
    Leucine,    // Leucine (LEU)
    Proline,    // Proline (PRO)
    Valine,     // Valine (VAL)

    // --- Aromatic ---
    Phenylalanine, // Phenylalanine (PHE)
    Tryptophan,    // Tryptophan (TRP)
    Tyrosine,      // Tyrosine (TYR)

    // --- Polar, Uncharged ---
    Asparagine, // Asparagine (ASN)
    Cysteine,   // Cysteine (CYS)
    Glutamine,  // Glutamine (GLN)
    Serine,     // Serine (SER)
    Threonine,  // Threonine (THR)
    Methionine, // Methionine (MET)

    // --- Positively Charged (Basic) ---
    Arginine, // Arginine (ARG)
    Lysine,   // Lysine (LYS)

    // --- Negatively Charged (Acidic) ---
    AsparticAcid, // Aspartic Acid (ASP)
    GlutamicAcid, // Glutamic Acid (GLU)

    // --- Histidine tautomers ---
    Histidine,           // Epsilon-protonated Histidine (HIS / HSE)
    HistidineDelta,      // Delta-protonated Histidine (HSD)
    HistidineProtonated, // Doubly-protonated Histidine (HSP)
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown amino acid code: '{0}'")]
pub struct ParseResidueTypeError(pub String);

impl FromStr for ResidueType {
    type Err = ParseResidueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALA" => Ok(Self::Alanine),
            "GLY" => Ok(Self::Glycine),
            "ILE" => Ok(Self::Isoleucine),
            "LEU" => Ok(Self::Leucine),
            "PRO" => Ok(Self::Proline),
            "VAL" => Ok(Self::Valine),
            "PHE" => Ok(Self::Phenylalanine),
            "TRP" => Ok(Self::Tryptophan),
            "TYR" => Ok(Self::Tyrosine),
            "ASN" => Ok(Self::Asparagine),
            "CYS" => Ok(Self::Cysteine),
            "GLN" => Ok(Self::Glutamine),
            "SER" => Ok(Self::Serine),
            "THR" => Ok(Self::Threonine),
            "MET" => Ok(Self::Methionine),
            "ARG" => Ok(Self::Arginine),
            "LYS" => Ok(Self::Lysine),
            "ASP" => Ok(Self::AsparticAcid),
            "GLU" => Ok(Self::GlutamicAcid),
            "HIS" | "HSE" => Ok(Self::Histidine),
            "HSD" => Ok(Self::HistidineDelta),
            "HSP" => Ok(Self::HistidineProtonated),
            other => Err(ParseResidueTypeError(other.to_string())),
        }
    }
}

impl ResidueType {
    pub fn to_three_letter(&self) -> &'static str {
        match self {
            Self::Alanine => "ALA",
            Self::Glycine => "GLY",
            Self::Isoleucine => "ILE",
            Self::Leucine => "LEU",
            Self::Proline => "PRO",
            Self::Valine => "VAL",
            Self::Phenylalanine => "PHE",
            Self::Tryptophan => "TRP",
            Self::Tyrosine => "TYR",
            Self::Asparagine => "ASN",
            Self::Cysteine => "CYS",
            Self::Glutamine => "GLN",
            Self::Serine => "SER",
            Self::Threonine => "THR",
            Self::Methionine => "MET",
            Self::Arginine => "ARG",
            Self::Lysine => "LYS",
            Self::AsparticAcid => "ASP",
            Self::GlutamicAcid => "GLU",
            Self::Histidine => "HSE",
            Self::HistidineDelta => "HSD",
            Self::HistidineProtonated => "HSP",
        }
    }
}

/// Per-residue secondary-structure label, as produced by DSSP-like assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SecondaryStructure {
    Helix,
    Strand,
    #[default]
    Loop,
}

impl SecondaryStructure {
    pub fn from_code(code: char) -> Self {
        match code.to_ascii_uppercase() {
            'H' | 'G' | 'I' => Self::Helix,
            'E' | 'B' => Self::Strand,
            _ => Self::Loop,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Self::Helix => 'H',
            Self::Strand => 'E',
            Self::Loop => 'L',
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChemistryError {
    #[error("Unknown amino acid '{name}' at residue {number}: no representative atom is defined")]
    UnknownAminoAcid { name: String, number: isize },
    #[error("Residue '{name}' {number} contains no atoms")]
    EmptyResidue { name: String, number: isize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub number: isize,                                // Residue sequence number from source file
    pub name: String,                                 // Name of the residue (e.g., "SER", "TP3")
    pub chain_id: ChainId,                            // ID of the parent chain
    pub chain_type: ChainType,                        // Polymer class of the parent chain
    pub residue_type: Option<ResidueType>,            // Amino-acid type, if the residue is one
    pub secondary_structure: SecondaryStructure,      // Label used by the SS-dependent weight
    pub(crate) seqpos: usize,                         // Index in the system's sequence order
    atoms: Vec<Atom>,                                 // Atoms, addressed by residue-local index
    atom_name_map: HashMap<String, usize>,            // Map from atom name to its local index
    bonds: Vec<Vec<usize>>,                           // Intra-residue covalent adjacency
    polar_hydrogens: Vec<usize>,                      // Hydrogens whose base is a donor
    acceptors: Vec<usize>,                            // Acceptor atoms
    nbr_atom: usize,                                  // Representative atom
    nbr_radius: f64,                                  // Max distance from nbr_atom to any atom
}

impl Residue {
    pub(crate) fn new(
        number: isize,
        name: &str,
        chain_id: ChainId,
        chain_type: ChainType,
        residue_type: Option<ResidueType>,
    ) -> Self {
        Self {
            number,
            name: name.to_string(),
            chain_id,
            chain_type,
            residue_type,
            secondary_structure: SecondaryStructure::default(),
            seqpos: 0,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
            bonds: Vec::new(),
            polar_hydrogens: Vec::new(),
            acceptors: Vec::new(),
            nbr_atom: 0,
            nbr_radius: 0.0,
        }
    }

    pub(crate) fn add_atom(&mut self, atom: Atom) -> usize {
        let index = self.atoms.len();
        self.atom_name_map.insert(atom.name.clone(), index);
        self.atoms.push(atom);
        self.bonds.push(Vec::new());
        index
    }

    /// Records a covalent bond between two atoms of this residue.
    ///
    /// Adding an existing bond is a no-op. Returns `None` if either index is
    /// out of range.
    pub(crate) fn add_bond(&mut self, a: usize, b: usize) -> Option<()> {
        if a >= self.atoms.len() || b >= self.atoms.len() || a == b {
            return None;
        }
        if !self.bonds[a].contains(&b) {
            self.bonds[a].push(b);
            self.bonds[b].push(a);
        }
        Some(())
    }

    pub(crate) fn atom_mut(&mut self, index: usize) -> Option<&mut Atom> {
        self.atoms.get_mut(index)
    }

    pub(crate) fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    /// Takes over the sequence identity of `site`, so this residue can stand in
    /// for it as an alternative conformation.
    pub(crate) fn adopt_site_of(&mut self, site: &Residue) {
        self.number = site.number;
        self.chain_id = site.chain_id;
        self.chain_type = site.chain_type;
        self.secondary_structure = site.secondary_structure;
        self.seqpos = site.seqpos;
    }

    #[inline]
    pub fn seqpos(&self) -> usize {
        self.seqpos
    }

    #[inline]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    #[inline]
    pub fn atom(&self, index: usize) -> &Atom {
        &self.atoms[index]
    }

    #[inline]
    pub fn position(&self, index: usize) -> &Point3<f64> {
        &self.atoms[index].position
    }

    pub fn atom_index(&self, name: &str) -> Option<usize> {
        self.atom_name_map.get(name).copied()
    }

    pub fn bonded_neighbors(&self, index: usize) -> &[usize] {
        self.bonds.get(index).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Number of covalent bonds separating two atoms, or `None` if they are
    /// not connected through this residue's bond graph.
    pub fn path_distance(&self, from: usize, to: usize) -> Option<usize> {
        if from == to {
            return Some(0);
        }
        let mut distance = vec![usize::MAX; self.atoms.len()];
        let mut queue = VecDeque::new();
        distance[from] = 0;
        queue.push_back(from);
        while let Some(current) = queue.pop_front() {
            for &next in &self.bonds[current] {
                if distance[next] == usize::MAX {
                    distance[next] = distance[current] + 1;
                    if next == to {
                        return Some(distance[next]);
                    }
                    queue.push_back(next);
                }
            }
        }
        None
    }

    #[inline]
    pub fn polar_hydrogens(&self) -> &[usize] {
        &self.polar_hydrogens
    }

    #[inline]
    pub fn acceptors(&self) -> &[usize] {
        &self.acceptors
    }

    /// Covalent parent of an atom; atoms without one are their own base.
    #[inline]
    pub fn atom_base(&self, index: usize) -> usize {
        self.atoms[index].base.unwrap_or(index)
    }

    /// Second base of an acceptor; falls back to the first base.
    #[inline]
    pub fn atom_base2(&self, index: usize) -> usize {
        self.atoms[index]
            .base2
            .unwrap_or_else(|| self.atom_base(index))
    }

    #[inline]
    pub fn is_backbone_atom(&self, index: usize) -> bool {
        self.atoms[index].is_backbone()
    }

    #[inline]
    pub fn is_protein(&self) -> bool {
        self.chain_type == ChainType::Protein
    }

    #[inline]
    pub fn is_dna(&self) -> bool {
        self.chain_type == ChainType::DNA
    }

    #[inline]
    pub fn is_rna(&self) -> bool {
        self.chain_type == ChainType::RNA
    }

    pub fn is_water(&self) -> bool {
        self.chain_type == ChainType::Water || is_water_residue(&self.name)
    }

    /// Whether the residue is a water of the hybrid explicit-water model.
    pub fn is_hybrid_water(&self) -> bool {
        self.name == HYBRID_WATER_RESIDUE_NAME
    }

    #[inline]
    pub fn nbr_atom(&self) -> usize {
        self.nbr_atom
    }

    #[inline]
    pub fn nbr_radius(&self) -> f64 {
        self.nbr_radius
    }

    #[inline]
    pub fn nbr_position(&self) -> &Point3<f64> {
        &self.atoms[self.nbr_atom].position
    }

    /// Moves one atom and keeps the bounding sphere up to date.
    pub fn set_atom_position(&mut self, index: usize, position: Point3<f64>) -> Option<()> {
        self.atoms.get_mut(index)?.position = position;
        self.update_nbr_radius();
        Some(())
    }

    /// Recomputes everything derived from the atoms: the polar hydrogen and
    /// acceptor lists and the representative atom with its radius.
    ///
    /// # Errors
    ///
    /// Returns [`ChemistryError::UnknownAminoAcid`] for protein residues whose
    /// name has no representative atom, and [`ChemistryError::EmptyResidue`] for
    /// residues without atoms.
    pub fn refresh(&mut self) -> Result<(), ChemistryError> {
        if self.atoms.is_empty() {
            return Err(ChemistryError::EmptyResidue {
                name: self.name.clone(),
                number: self.number,
            });
        }

        self.polar_hydrogens = (0..self.atoms.len())
            .filter(|&i| {
                let atom = &self.atoms[i];
                atom.is_hydrogen
                    && atom
                        .base
                        .is_some_and(|b| b != i && self.atoms[b].is_donor())
            })
            .collect();
        self.acceptors = (0..self.atoms.len())
            .filter(|&i| self.atoms[i].is_acceptor())
            .collect();

        self.nbr_atom = self.find_nbr_atom()?;
        self.update_nbr_radius();
        Ok(())
    }

    fn find_nbr_atom(&self) -> Result<usize, ChemistryError> {
        if self.is_protein() {
            let name = representative_atom_name(&self.name).ok_or_else(|| {
                ChemistryError::UnknownAminoAcid {
                    name: self.name.clone(),
                    number: self.number,
                }
            })?;
            if let Some(index) = self.atom_index(name) {
                return Ok(index);
            }
        }

        let n = self.atoms.len() as f64;
        let centroid = self
            .atoms
            .iter()
            .fold(Point3::origin(), |acc, a| acc + a.position.coords / n);
        let closest = self
            .atoms
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                nalgebra::distance_squared(&a.position, &centroid)
                    .total_cmp(&nalgebra::distance_squared(&b.position, &centroid))
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        Ok(closest)
    }

    fn update_nbr_radius(&mut self) {
        let Some(center) = self.atoms.get(self.nbr_atom).map(|a| a.position) else {
            self.nbr_radius = 0.0;
            return;
        };
        self.nbr_radius = self
            .atoms
            .iter()
            .map(|a| nalgebra::distance(&a.position, &center))
            .fold(0.0, f64::max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::types::HBDonChemType;
    use slotmap::KeyData;

    fn dummy_chain_id(n: u64) -> ChainId {
        ChainId::from(KeyData::from_ffi(n))
    }

    fn serine() -> Residue {
        let mut residue = Residue::new(
            5,
            "SER",
            dummy_chain_id(1),
            ChainType::Protein,
            Some(ResidueType::Serine),
        );
        let ca = residue.add_atom(Atom::new("CA", Point3::new(0.0, 0.0, 0.0)));
        let cb = residue.add_atom(Atom::new("CB", Point3::new(1.5, 0.0, 0.0)));
        let og = residue.add_atom(Atom::new("OG", Point3::new(2.0, 1.3, 0.0)));
        let hg = residue.add_atom(Atom::new("HG", Point3::new(2.9, 1.3, 0.0)));
        residue.add_bond(ca, cb).unwrap();
        residue.add_bond(cb, og).unwrap();
        residue.add_bond(og, hg).unwrap();
        residue
    }

    #[test]
    fn from_str_parses_three_letter_codes_and_histidine_aliases() {
        assert_eq!("ser".parse::<ResidueType>(), Ok(ResidueType::Serine));
        assert_eq!("HIS".parse::<ResidueType>(), Ok(ResidueType::Histidine));
        assert_eq!("HSE".parse::<ResidueType>(), Ok(ResidueType::Histidine));
        assert_eq!(
            "XYZ".parse::<ResidueType>(),
            Err(ParseResidueTypeError("XYZ".to_string()))
        );
        assert_eq!(ResidueType::Histidine.to_three_letter(), "HSE");
    }

    #[test]
    fn secondary_structure_maps_dssp_codes() {
        assert_eq!(SecondaryStructure::from_code('H'), SecondaryStructure::Helix);
        assert_eq!(SecondaryStructure::from_code('g'), SecondaryStructure::Helix);
        assert_eq!(SecondaryStructure::from_code('E'), SecondaryStructure::Strand);
        assert_eq!(SecondaryStructure::from_code('-'), SecondaryStructure::Loop);
        assert_eq!(SecondaryStructure::Helix.code(), 'H');
    }

    #[test]
    fn path_distance_follows_covalent_bonds() {
        let residue = serine();
        assert_eq!(residue.path_distance(0, 0), Some(0));
        assert_eq!(residue.path_distance(0, 3), Some(3));
        assert_eq!(residue.path_distance(3, 1), Some(2));
    }

    #[test]
    fn path_distance_is_none_for_disconnected_atoms() {
        let mut residue = serine();
        residue.add_atom(Atom::new("OXT", Point3::new(9.0, 0.0, 0.0)));
        assert_eq!(residue.path_distance(0, 4), None);
    }

    #[test]
    fn add_bond_rejects_invalid_indices_and_is_idempotent() {
        let mut residue = serine();
        assert!(residue.add_bond(0, 99).is_none());
        assert!(residue.add_bond(1, 1).is_none());
        residue.add_bond(0, 1).unwrap();
        assert_eq!(residue.bonded_neighbors(0), &[1]);
    }

    #[test]
    fn refresh_collects_polar_hydrogens_and_acceptors() {
        let mut residue = serine();
        let og = residue.atom_index("OG").unwrap();
        let hg = residue.atom_index("HG").unwrap();
        residue.atom_mut(og).unwrap().donor_type = Some(HBDonChemType::Ahx);
        residue.atom_mut(og).unwrap().acceptor_type =
            Some(crate::core::forcefield::types::HBAccChemType::Ahx);
        residue.atom_mut(hg).unwrap().base = Some(og);

        residue.refresh().unwrap();

        assert_eq!(residue.polar_hydrogens(), &[hg]);
        assert_eq!(residue.acceptors(), &[og]);
        assert_eq!(residue.atom_base(hg), og);
        assert_eq!(residue.atom_base(og), og);
    }

    #[test]
    fn refresh_uses_cb_as_representative_atom_for_proteins() {
        let mut residue = serine();
        residue.refresh().unwrap();
        assert_eq!(residue.nbr_atom(), 1);
        let expected: f64 = nalgebra::distance(&Point3::new(1.5, 0.0, 0.0), &Point3::new(2.9, 1.3, 0.0));
        assert!((residue.nbr_radius() - expected).abs() < 1e-12);
    }

    #[test]
    fn refresh_fails_for_unknown_amino_acid() {
        let mut residue = Residue::new(1, "XXX", dummy_chain_id(1), ChainType::Protein, None);
        residue.add_atom(Atom::new("CA", Point3::origin()));
        assert_eq!(
            residue.refresh(),
            Err(ChemistryError::UnknownAminoAcid {
                name: "XXX".to_string(),
                number: 1
            })
        );
    }

    #[test]
    fn refresh_fails_for_empty_residue() {
        let mut residue = Residue::new(2, "TP3", dummy_chain_id(1), ChainType::Water, None);
        assert!(matches!(
            residue.refresh(),
            Err(ChemistryError::EmptyResidue { .. })
        ));
    }

    #[test]
    fn set_atom_position_updates_bounding_radius() {
        let mut residue = serine();
        residue.refresh().unwrap();
        residue
            .set_atom_position(3, Point3::new(1.5, 5.0, 0.0))
            .unwrap();
        assert!((residue.nbr_radius() - 5.0).abs() < 1e-12);
        assert!(residue.set_atom_position(42, Point3::origin()).is_none());
    }

    #[test]
    fn water_detection_uses_chain_type_and_name() {
        let water = Residue::new(1, "TP3", dummy_chain_id(2), ChainType::Other, None);
        assert!(water.is_water());
        assert!(water.is_hybrid_water());
        let hoh = Residue::new(1, "HOH", dummy_chain_id(2), ChainType::Water, None);
        assert!(hoh.is_water());
        assert!(!hoh.is_hybrid_water());
    }
}
