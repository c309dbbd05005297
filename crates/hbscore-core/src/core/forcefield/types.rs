use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chemical class of a hydrogen-bond donor group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HBDonChemType {
    /// Protein backbone amide.
    Pba,
    /// Sidechain carboxamide (ASN, GLN).
    Cxa,
    /// Imidazole, delta-protonated (HIS ND1).
    Imd,
    /// Imidazole, epsilon-protonated (HIS NE2).
    Ime,
    /// Indole (TRP NE1).
    Ind,
    /// Primary amine (LYS NZ).
    Amo,
    /// Guanidinium (ARG NE/NH1/NH2).
    Gdh,
    /// Aliphatic hydroxyl (SER, THR).
    Ahx,
    /// Aromatic hydroxyl (TYR).
    Hxl,
    /// Water.
    H2o,
    /// Any donor not covered above (nucleobase amines, ligands).
    Generic,
}

/// Chemical class of a hydrogen-bond acceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HBAccChemType {
    /// Protein backbone carbonyl.
    Pba,
    /// Sidechain carboxamide oxygen (ASN, GLN).
    Cxa,
    /// Carboxylate oxygen (ASP, GLU, C terminus).
    Cxl,
    /// Imidazole nitrogen, delta position.
    Imd,
    /// Imidazole nitrogen, epsilon position.
    Ime,
    /// Aliphatic hydroxyl oxygen.
    Ahx,
    /// Aromatic hydroxyl oxygen.
    Hxl,
    /// Water oxygen.
    H2o,
    /// Nucleic-acid backbone phosphate oxygen.
    Phosphate,
    /// Any acceptor not covered above.
    Generic,
}

/// Hybridization of an acceptor, deciding how its base atoms orient the bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hybridization {
    Sp2,
    Sp3,
    /// Aromatic ring nitrogen; oriented by the midpoint of its two ring neighbors.
    Ring,
}

impl HBAccChemType {
    pub fn hybridization(&self) -> Hybridization {
        match self {
            Self::Pba | Self::Cxa | Self::Cxl | Self::Phosphate | Self::Generic => {
                Hybridization::Sp2
            }
            Self::Ahx | Self::Hxl | Self::H2o => Hybridization::Sp3,
            Self::Imd | Self::Ime => Hybridization::Ring,
        }
    }

    pub const ALL: [HBAccChemType; 10] = [
        Self::Pba,
        Self::Cxa,
        Self::Cxl,
        Self::Imd,
        Self::Ime,
        Self::Ahx,
        Self::Hxl,
        Self::H2o,
        Self::Phosphate,
        Self::Generic,
    ];
}

impl HBDonChemType {
    pub const ALL: [HBDonChemType; 11] = [
        Self::Pba,
        Self::Cxa,
        Self::Imd,
        Self::Ime,
        Self::Ind,
        Self::Amo,
        Self::Gdh,
        Self::Ahx,
        Self::Hxl,
        Self::H2o,
        Self::Generic,
    ];
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown hydrogen-bond chemical type: '{0}'")]
pub struct ParseChemTypeError(pub String);

impl FromStr for HBDonChemType {
    type Err = ParseChemTypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PBA" => Ok(Self::Pba),
            "CXA" => Ok(Self::Cxa),
            "IMD" => Ok(Self::Imd),
            "IME" => Ok(Self::Ime),
            "IND" => Ok(Self::Ind),
            "AMO" => Ok(Self::Amo),
            "GDH" | "GDE" => Ok(Self::Gdh),
            "AHX" => Ok(Self::Ahx),
            "HXL" => Ok(Self::Hxl),
            "H2O" => Ok(Self::H2o),
            "GENERIC" => Ok(Self::Generic),
            other => Err(ParseChemTypeError(other.to_string())),
        }
    }
}

impl FromStr for HBAccChemType {
    type Err = ParseChemTypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PBA" => Ok(Self::Pba),
            "CXA" => Ok(Self::Cxa),
            "CXL" => Ok(Self::Cxl),
            "IMD" => Ok(Self::Imd),
            "IME" => Ok(Self::Ime),
            "AHX" => Ok(Self::Ahx),
            "HXL" => Ok(Self::Hxl),
            "H2O" => Ok(Self::H2o),
            "PHOSPHATE" | "PCA_DNA" => Ok(Self::Phosphate),
            "GENERIC" => Ok(Self::Generic),
            other => Err(ParseChemTypeError(other.to_string())),
        }
    }
}

/// Sequence-separation class of a donor/acceptor pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HBSeqSep {
    /// Donor and acceptor belong to the same residue.
    Intra,
    /// Same chain, at most [`SHORT_RANGE_MAX_SEPARATION`] residues apart.
    Short,
    /// Everything else, including pairs on different chains.
    Long,
}

/// Largest |acceptor - donor| sequence separation classified as short range.
pub const SHORT_RANGE_MAX_SEPARATION: isize = 4;

impl HBSeqSep {
    /// Classifies a signed separation (`acceptor seqpos - donor seqpos`).
    pub fn classify(separation: isize, same_chain: bool) -> Self {
        if !same_chain {
            Self::Long
        } else if separation == 0 {
            Self::Intra
        } else if separation.abs() <= SHORT_RANGE_MAX_SEPARATION {
            Self::Short
        } else {
            Self::Long
        }
    }
}

/// Score-term bucket a hydrogen bond contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HBEvalWeightType {
    /// Short-range backbone/backbone (helices, turns).
    SrBb,
    /// Long-range backbone/backbone (sheets).
    LrBb,
    /// Backbone/sidechain in either direction.
    BbSc,
    /// Sidechain/sidechain.
    Sc,
}

impl fmt::Display for HBEvalWeightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SrBb => "sr_bb",
            Self::LrBb => "lr_bb",
            Self::BbSc => "bb_sc",
            Self::Sc => "sc",
        };
        write!(f, "{name}")
    }
}

/// Classification key of a hydrogen bond: donor chemistry, acceptor chemistry
/// and sequence separation, plus the score bucket it lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HBEvalTuple {
    pub don_type: HBDonChemType,
    pub acc_type: HBAccChemType,
    pub seq_sep: HBSeqSep,
    pub weight_type: HBEvalWeightType,
}

impl HBEvalTuple {
    /// Classifies a donor/acceptor pair.
    ///
    /// # Arguments
    ///
    /// * `don_type` / `don_is_backbone` - Chemistry and role of the donor heavy atom.
    /// * `acc_type` / `acc_is_backbone` - Chemistry and role of the acceptor.
    /// * `separation` - Signed `acceptor seqpos - donor seqpos`.
    /// * `same_chain` - Whether donor and acceptor residues share a chain.
    pub fn classify(
        don_type: HBDonChemType,
        don_is_backbone: bool,
        acc_type: HBAccChemType,
        acc_is_backbone: bool,
        separation: isize,
        same_chain: bool,
    ) -> Self {
        let seq_sep = HBSeqSep::classify(separation, same_chain);
        let weight_type = match (don_is_backbone, acc_is_backbone) {
            (true, true) if seq_sep == HBSeqSep::Short => HBEvalWeightType::SrBb,
            (true, true) => HBEvalWeightType::LrBb,
            (true, false) | (false, true) => HBEvalWeightType::BbSc,
            (false, false) => HBEvalWeightType::Sc,
        };
        Self {
            don_type,
            acc_type,
            seq_sep,
            weight_type,
        }
    }

    #[inline]
    pub fn acc_hybridization(&self) -> Hybridization {
        self.acc_type.hybridization()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_sep_classification_respects_chain_and_window() {
        assert_eq!(HBSeqSep::classify(0, true), HBSeqSep::Intra);
        assert_eq!(HBSeqSep::classify(4, true), HBSeqSep::Short);
        assert_eq!(HBSeqSep::classify(-4, true), HBSeqSep::Short);
        assert_eq!(HBSeqSep::classify(5, true), HBSeqSep::Long);
        assert_eq!(HBSeqSep::classify(1, false), HBSeqSep::Long);
    }

    #[test]
    fn backbone_pairs_split_into_short_and_long_range() {
        let sr = HBEvalTuple::classify(HBDonChemType::Pba, true, HBAccChemType::Pba, true, -4, true);
        assert_eq!(sr.weight_type, HBEvalWeightType::SrBb);
        let lr = HBEvalTuple::classify(HBDonChemType::Pba, true, HBAccChemType::Pba, true, 12, true);
        assert_eq!(lr.weight_type, HBEvalWeightType::LrBb);
        let interchain =
            HBEvalTuple::classify(HBDonChemType::Pba, true, HBAccChemType::Pba, true, 1, false);
        assert_eq!(interchain.weight_type, HBEvalWeightType::LrBb);
    }

    #[test]
    fn mixed_and_sidechain_pairs_get_their_buckets() {
        let bbsc = HBEvalTuple::classify(HBDonChemType::Pba, true, HBAccChemType::Ahx, false, 2, true);
        assert_eq!(bbsc.weight_type, HBEvalWeightType::BbSc);
        let scbb = HBEvalTuple::classify(HBDonChemType::Ahx, false, HBAccChemType::Pba, true, 2, true);
        assert_eq!(scbb.weight_type, HBEvalWeightType::BbSc);
        let sc = HBEvalTuple::classify(HBDonChemType::Amo, false, HBAccChemType::Cxl, false, 9, true);
        assert_eq!(sc.weight_type, HBEvalWeightType::Sc);
    }

    #[test]
    fn acceptor_hybridization_follows_chemistry() {
        assert_eq!(HBAccChemType::Pba.hybridization(), Hybridization::Sp2);
        assert_eq!(HBAccChemType::Ahx.hybridization(), Hybridization::Sp3);
        assert_eq!(HBAccChemType::Ime.hybridization(), Hybridization::Ring);
    }

    #[test]
    fn chem_types_parse_case_insensitively() {
        assert_eq!("pba".parse::<HBDonChemType>(), Ok(HBDonChemType::Pba));
        assert_eq!("GDE".parse::<HBDonChemType>(), Ok(HBDonChemType::Gdh));
        assert_eq!("phosphate".parse::<HBAccChemType>(), Ok(HBAccChemType::Phosphate));
        assert!("XYZ".parse::<HBAccChemType>().is_err());
    }
}
