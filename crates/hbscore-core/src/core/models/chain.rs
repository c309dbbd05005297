use super::ids::ResidueId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainType {
    Protein,
    DNA,
    RNA,
    Ligand,
    Water,
    Other,
}

impl ChainType {
    #[inline]
    pub fn is_polymer(&self) -> bool {
        matches!(self, ChainType::Protein | ChainType::DNA | ChainType::RNA)
    }
}

#[derive(Debug, Error)]
#[error("Invalid chain type string")]
pub struct ParseChainTypeError;

impl FromStr for ChainType {
    type Err = ParseChainTypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "protein" => Ok(ChainType::Protein),
            "dna" => Ok(ChainType::DNA),
            "rna" => Ok(ChainType::RNA),
            "ligand" => Ok(ChainType::Ligand),
            "water" => Ok(ChainType::Water),
            "other" => Ok(ChainType::Other),
            _ => Err(ParseChainTypeError),
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ChainType::Protein => "Protein",
                ChainType::DNA => "DNA",
                ChainType::RNA => "RNA",
                ChainType::Ligand => "Ligand",
                ChainType::Water => "Water",
                ChainType::Other => "Other",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub id: char,                        // Chain identifier (e.g., 'A', 'B')
    pub chain_type: ChainType,           // Type of the chain
    pub(crate) residues: Vec<ResidueId>, // Ordered list of residue IDs belonging to this chain
}

impl Chain {
    pub(crate) fn new(id: char, chain_type: ChainType) -> Self {
        Self {
            id,
            chain_type,
            residues: Vec::new(),
        }
    }

    pub fn residues(&self) -> &[ResidueId] {
        &self.residues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_parses_known_chain_types_case_insensitively() {
        assert_eq!("protein".parse::<ChainType>().unwrap(), ChainType::Protein);
        assert_eq!("DNA".parse::<ChainType>().unwrap(), ChainType::DNA);
        assert_eq!("Water".parse::<ChainType>().unwrap(), ChainType::Water);
        assert!("membrane".parse::<ChainType>().is_err());
    }

    #[test]
    fn polymer_chain_types_are_protein_and_nucleic_acids() {
        assert!(ChainType::Protein.is_polymer());
        assert!(ChainType::RNA.is_polymer());
        assert!(!ChainType::Water.is_polymer());
        assert!(!ChainType::Ligand.is_polymer());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for ty in [ChainType::Protein, ChainType::DNA, ChainType::Ligand] {
            assert_eq!(ty.to_string().parse::<ChainType>().unwrap(), ty);
        }
    }
}
