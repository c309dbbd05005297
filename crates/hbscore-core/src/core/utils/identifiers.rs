use phf::{Map, Set, phf_map, phf_set};

static BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "H", "HN", "CA", "HA", "C", "O", "OXT", "H1", "H2", "H3", "NT",
    "HT1", "HT2", "HT3", "OT1", "OT2", "HC", "HOXT", "HA1", "HA2", "1HA", "2HA",
};

static NUCLEIC_BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "P", "OP1", "OP2", "O1P", "O2P", "O5'", "C5'", "C4'", "O4'", "C3'", "O3'",
    "C2'", "O2'", "C1'", "H5'", "H5''", "H4'", "H3'", "H2'", "H2''", "HO2'", "H1'",
};

// Representative ("neighbor") atom of each amino acid, used for the ten-Angstrom
// neighbor graph and for bounding-sphere rejection between residues.
static REPRESENTATIVE_ATOM_NAMES: Map<&'static str, &'static str> = phf_map! {
    "ALA" => "CB", "ARG" => "CB", "ASN" => "CB", "ASP" => "CB", "CYS" => "CB",
    "GLN" => "CB", "GLU" => "CB", "GLY" => "CA", "HIS" => "CB", "HSE" => "CB",
    "HSD" => "CB", "HSP" => "CB", "ILE" => "CB", "LEU" => "CB", "LYS" => "CB",
    "MET" => "CB", "PHE" => "CB", "PRO" => "CB", "SER" => "CB", "THR" => "CB",
    "TRP" => "CB", "TYR" => "CB", "VAL" => "CB",
};

static WATER_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "TP3", "HOH", "WAT", "TIP3",
};

/// Residue name used by the hybrid water model; bonds to these residues are
/// scored into the water buckets.
pub const HYBRID_WATER_RESIDUE_NAME: &str = "TP3";

pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

pub fn is_nucleic_backbone_atom(atom_name: &str) -> bool {
    NUCLEIC_BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

pub fn is_heavy_atom(atom_name: &str) -> bool {
    let first_char = atom_name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase());
    !matches!(first_char, Some('H') | Some('D'))
}

pub fn representative_atom_name(residue_name: &str) -> Option<&'static str> {
    REPRESENTATIVE_ATOM_NAMES.get(residue_name.trim()).copied()
}

pub fn is_water_residue(residue_name: &str) -> bool {
    WATER_RESIDUE_NAMES.contains(residue_name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_backbone_atom_recognizes_standard_backbone_atoms() {
        assert!(is_backbone_atom("N"));
        assert!(is_backbone_atom("CA"));
        assert!(is_backbone_atom("C"));
        assert!(is_backbone_atom("O"));
        assert!(is_backbone_atom("H"));
    }

    #[test]
    fn is_backbone_atom_is_case_sensitive_and_trims_whitespace() {
        assert!(!is_backbone_atom("ca"));
        assert!(is_backbone_atom(" CA "));
        assert!(!is_backbone_atom("CB"));
    }

    #[test]
    fn nucleic_backbone_contains_phosphate_and_sugar_atoms() {
        assert!(is_nucleic_backbone_atom("OP1"));
        assert!(is_nucleic_backbone_atom("O3'"));
        assert!(!is_nucleic_backbone_atom("N1"));
    }

    #[test]
    fn is_heavy_atom_returns_false_for_hydrogen_and_deuterium() {
        assert!(!is_heavy_atom("H"));
        assert!(!is_heavy_atom("HG"));
        assert!(!is_heavy_atom("D2"));
        assert!(is_heavy_atom("OG"));
        assert!(is_heavy_atom(" N "));
    }

    #[test]
    fn representative_atom_is_cb_except_for_glycine() {
        assert_eq!(representative_atom_name("SER"), Some("CB"));
        assert_eq!(representative_atom_name("GLY"), Some("CA"));
        assert_eq!(representative_atom_name("XYZ"), None);
    }

    #[test]
    fn water_residue_names_include_hybrid_water() {
        assert!(is_water_residue(HYBRID_WATER_RESIDUE_NAME));
        assert!(is_water_residue("HOH"));
        assert!(!is_water_residue("SER"));
    }
}
