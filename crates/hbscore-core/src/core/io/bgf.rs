use crate::core::io::traits::MolecularFile;
use crate::core::models::builder::{BuildError, MolecularSystemBuilder};
use crate::core::models::chain::ChainType;
use crate::core::models::system::MolecularSystem;
use crate::core::utils::identifiers::is_water_residue;
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

/// Non-structural content of a BGF file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BgfMetadata {
    /// Header records (`BIOGRF`, `DESCRP`, `REMARK`, `FORCEFIELD`, ...), verbatim.
    pub header_lines: Vec<String>,
    /// `CONECT` bonds that crossed residue boundaries and were not stored.
    pub dropped_bonds: usize,
}

#[derive(Debug, Error)]
pub enum BgfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: BgfParseErrorKind,
    },
    #[error("Inconsistent data on line {line}: {source}")]
    Inconsistency { line: usize, source: BuildError },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum BgfParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 60 chars)")]
    LineTooShort,
}

const DNA_RESIDUE_NAMES: [&str; 4] = ["DA", "DC", "DG", "DT"];
const RNA_RESIDUE_NAMES: [&str; 8] = ["A", "C", "G", "U", "RA", "RC", "RG", "RU"];

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

/// Polymer class of a chain, decided by the first residue seen on it.
fn chain_type_for(record_type: &str, residue_name: &str) -> ChainType {
    if is_water_residue(residue_name) {
        ChainType::Water
    } else if DNA_RESIDUE_NAMES.contains(&residue_name) {
        ChainType::DNA
    } else if RNA_RESIDUE_NAMES.contains(&residue_name) {
        ChainType::RNA
    } else if record_type == "HETATM" {
        ChainType::Ligand
    } else {
        ChainType::Protein
    }
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, BgfError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| BgfError::Parse {
        line: line_num,
        kind: BgfParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn parse_int<T: std::str::FromStr>(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
) -> Result<T, BgfError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| BgfError::Parse {
        line: line_num,
        kind: BgfParseErrorKind::InvalidInt {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

/// Reader for the BioGraf (BGF) format.
pub struct BgfFile;

impl MolecularFile for BgfFile {
    type Metadata = BgfMetadata;
    type Error = BgfError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut builder = MolecularSystemBuilder::new();
        let mut metadata = BgfMetadata::default();
        let mut conect: Vec<(usize, usize, usize)> = Vec::new();

        let mut current_chain = None;
        let mut current_residue = None;
        let mut atom_count = 0usize;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let record_type = slice_and_trim(&line, 0, 6);

            match record_type {
                "" => continue,
                "ATOM" | "HETATM" => {
                    if line.len() < 60 {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::LineTooShort,
                        });
                    }
                    let serial: usize = parse_int(&line, line_num, 7, 12)?;
                    let name = slice_and_trim(&line, 13, 18);
                    if name.is_empty() {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::MissingRequiredField {
                                columns: "14-18".into(),
                            },
                        });
                    }
                    let res_name = slice_and_trim(&line, 19, 22);
                    let chain_id = slice_and_trim(&line, 23, 24).chars().next().unwrap_or('A');
                    let res_number: isize = parse_int(&line, line_num, 25, 30)?;
                    let position = Point3::new(
                        parse_float(&line, line_num, 30, 40)?,
                        parse_float(&line, line_num, 40, 50)?,
                        parse_float(&line, line_num, 50, 60)?,
                    );

                    let inconsistency = |source| BgfError::Inconsistency {
                        line: line_num,
                        source,
                    };
                    if current_chain != Some(chain_id) {
                        // A chain seen before keeps the type of its first residue.
                        builder.start_chain(chain_id, chain_type_for(record_type, res_name));
                        current_chain = Some(chain_id);
                        current_residue = None;
                    }
                    if current_residue != Some(res_number) {
                        builder
                            .start_residue(res_number, res_name)
                            .map_err(inconsistency)?;
                        current_residue = Some(res_number);
                    }
                    builder
                        .add_atom(serial, name, position)
                        .map_err(inconsistency)?;
                    atom_count += 1;
                }
                "CONECT" => {
                    let mut serials = line
                        .split_whitespace()
                        .skip(1)
                        .filter_map(|s| s.parse::<usize>().ok());
                    if let Some(first) = serials.next() {
                        for other in serials {
                            conect.push((first.min(other), first.max(other), line_num));
                        }
                    }
                }
                "END" => break,
                "FORMAT" | "ORDER" => {}
                _ => metadata.header_lines.push(line.clone()),
            }
        }

        if atom_count == 0 {
            return Err(BgfError::MissingRecord("ATOM/HETATM records".into()));
        }

        conect.sort_unstable();
        conect.dedup_by_key(|(a, b, _)| (*a, *b));
        for (a, b, line) in conect {
            if a == b {
                continue;
            }
            builder
                .add_bond(a, b)
                .map_err(|source| BgfError::Inconsistency { line, source })?;
        }
        metadata.dropped_bonds = builder.dropped_bonds();

        let system = builder.build();
        debug!(
            residues = system.total_residue(),
            atoms = atom_count,
            dropped_bonds = metadata.dropped_bonds,
            "Parsed BGF structure."
        );
        Ok((system, metadata))
    }
}
