use super::potentials::{FadeInterval, Polynomial1D};
use super::types::{HBAccChemType, HBDonChemType, HBEvalTuple, HBSeqSep};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const STANDARD_POLYNOMIALS: &str = include_str!("../../../data/hbond_polynomials.csv");
const STANDARD_EVALUATIONS: &str = include_str!("../../../data/hbond_evaluations.csv");

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid record in '{path}' (line {line}): {message}")]
    Invalid {
        path: String,
        line: u64,
        message: String,
    },
    #[error("'{path}' references unknown polynomial '{name}'")]
    UnknownPolynomial { path: String, name: String },
    #[error("No evaluation parameters for donor {donor:?}, acceptor {acceptor:?}, separation {separation:?}")]
    MissingEntry {
        donor: HBDonChemType,
        acceptor: HBAccChemType,
        separation: HBSeqSep,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SeparationKey {
    Intra,
    Short,
    Long,
    Any,
}

impl From<HBSeqSep> for SeparationKey {
    fn from(sep: HBSeqSep) -> Self {
        match sep {
            HBSeqSep::Intra => Self::Intra,
            HBSeqSep::Short => Self::Short,
            HBSeqSep::Long => Self::Long,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EvaluationRecord {
    donor: HBDonChemType,
    acceptor: HBAccChemType,
    separation: SeparationKey,
    ahdist: String,
    cosbah: String,
    cosahd: String,
    chi: f64,
    fade_min: f64,
    fade_max: f64,
}

/// Functional form of one hydrogen-bond class.
#[derive(Debug, Clone, PartialEq)]
pub struct HBEvalParams {
    /// Energy as a function of the H···A distance.
    pub distance: Polynomial1D,
    /// Energy as a function of the cosine of the B-A···H angle.
    pub cos_bah: Polynomial1D,
    /// Energy as a function of the cosine of the A···H-D angle.
    pub cos_ahd: Polynomial1D,
    /// Amplitude of the sp2 out-of-plane term; ignored for other acceptors.
    pub chi_amplitude: f64,
    /// Distance fade applied to the angular terms.
    pub fade: FadeInterval,
}

const SEPARATIONS: [HBSeqSep; 3] = [HBSeqSep::Intra, HBSeqSep::Short, HBSeqSep::Long];

/// Immutable parameter database for hydrogen-bond evaluation.
///
/// Every donor/acceptor/separation combination resolves to an entry: a table
/// lookup tries the exact separation first and then the `any` row, and an
/// uncovered combination fails the load.
#[derive(Debug, Clone)]
pub struct HBondDatabase {
    polynomials: HashMap<String, Polynomial1D>,
    table: Vec<HBEvalParams>,
}

impl HBondDatabase {
    pub fn load(polynomial_path: &Path, evaluation_path: &Path) -> Result<Self, ParamLoadError> {
        let polynomials = read_file(polynomial_path)?;
        let evaluations = read_file(evaluation_path)?;
        Self::from_tables(
            &polynomials,
            &polynomial_path.to_string_lossy(),
            &evaluations,
            &evaluation_path.to_string_lossy(),
        )
    }

    /// The parameter tables bundled with the crate.
    pub fn standard() -> Result<Self, ParamLoadError> {
        Self::from_tables(
            STANDARD_POLYNOMIALS,
            "<standard polynomials>",
            STANDARD_EVALUATIONS,
            "<standard evaluations>",
        )
    }

    pub fn from_tables(
        polynomials: &str,
        polynomial_source: &str,
        evaluations: &str,
        evaluation_source: &str,
    ) -> Result<Self, ParamLoadError> {
        let polynomials = parse_polynomials(polynomials, polynomial_source)?;
        let rows = parse_evaluations(evaluations, evaluation_source, &polynomials)?;

        let mut table = Vec::with_capacity(
            HBDonChemType::ALL.len() * HBAccChemType::ALL.len() * SEPARATIONS.len(),
        );
        for donor in HBDonChemType::ALL {
            for acceptor in HBAccChemType::ALL {
                for separation in SEPARATIONS {
                    let entry = rows
                        .get(&(donor, acceptor, SeparationKey::from(separation)))
                        .or_else(|| rows.get(&(donor, acceptor, SeparationKey::Any)))
                        .ok_or(ParamLoadError::MissingEntry {
                            donor,
                            acceptor,
                            separation,
                        })?;
                    table.push(entry.clone());
                }
            }
        }

        Ok(Self { polynomials, table })
    }

    /// Parameters for a classified donor/acceptor pair.
    #[inline]
    pub fn params(&self, tuple: &HBEvalTuple) -> &HBEvalParams {
        &self.table[table_index(tuple.don_type, tuple.acc_type, tuple.seq_sep)]
    }

    pub fn polynomial(&self, name: &str) -> Option<&Polynomial1D> {
        self.polynomials.get(name)
    }
}

#[inline]
fn table_index(donor: HBDonChemType, acceptor: HBAccChemType, separation: HBSeqSep) -> usize {
    let sep = match separation {
        HBSeqSep::Intra => 0,
        HBSeqSep::Short => 1,
        HBSeqSep::Long => 2,
    };
    (donor as usize * HBAccChemType::ALL.len() + acceptor as usize) * SEPARATIONS.len() + sep
}

fn read_file(path: &Path) -> Result<String, ParamLoadError> {
    std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

fn reader(content: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(content.as_bytes())
}

/// Parses `name,xmin,xmax,degree,coefficients...` rows, coefficients listed
/// from the highest degree down.
fn parse_polynomials(
    content: &str,
    source: &str,
) -> Result<HashMap<String, Polynomial1D>, ParamLoadError> {
    let mut polynomials = HashMap::new();
    for result in reader(content).records() {
        let record = result.map_err(|e| ParamLoadError::Csv {
            path: source.to_string(),
            source: e,
        })?;
        let line = record.position().map_or(0, |p| p.line());
        let invalid = |message: String| ParamLoadError::Invalid {
            path: source.to_string(),
            line,
            message,
        };

        if record.len() < 5 {
            return Err(invalid(format!(
                "expected at least 5 fields, found {}",
                record.len()
            )));
        }
        let name = &record[0];
        let number = |i: usize| -> Result<f64, ParamLoadError> {
            record[i]
                .parse::<f64>()
                .map_err(|e| invalid(format!("field {} ('{}'): {e}", i + 1, &record[i])))
        };
        let xmin = number(1)?;
        let xmax = number(2)?;
        let degree: usize = record[3]
            .parse()
            .map_err(|e| invalid(format!("degree '{}': {e}", &record[3])))?;
        let coefficients = (4..record.len())
            .map(number)
            .collect::<Result<Vec<_>, _>>()?;

        if coefficients.len() != degree + 1 {
            return Err(invalid(format!(
                "polynomial '{name}' declares degree {degree} but has {} coefficients",
                coefficients.len()
            )));
        }
        if xmin >= xmax {
            return Err(invalid(format!(
                "polynomial '{name}' has an empty range [{xmin}, {xmax}]"
            )));
        }
        polynomials.insert(
            name.to_string(),
            Polynomial1D::new(name, xmin, xmax, coefficients),
        );
    }
    Ok(polynomials)
}

fn parse_evaluations(
    content: &str,
    source: &str,
    polynomials: &HashMap<String, Polynomial1D>,
) -> Result<HashMap<(HBDonChemType, HBAccChemType, SeparationKey), HBEvalParams>, ParamLoadError>
{
    let lookup = |name: &str| {
        polynomials
            .get(name)
            .cloned()
            .ok_or_else(|| ParamLoadError::UnknownPolynomial {
                path: source.to_string(),
                name: name.to_string(),
            })
    };

    let mut rows = HashMap::new();
    for result in reader(content).deserialize::<EvaluationRecord>() {
        let record = result.map_err(|e| ParamLoadError::Csv {
            path: source.to_string(),
            source: e,
        })?;
        if record.fade_min > record.fade_max {
            return Err(ParamLoadError::Invalid {
                path: source.to_string(),
                line: 0,
                message: format!(
                    "fade interval [{}, {}] for {:?}/{:?} is inverted",
                    record.fade_min, record.fade_max, record.donor, record.acceptor
                ),
            });
        }
        let params = HBEvalParams {
            distance: lookup(&record.ahdist)?,
            cos_bah: lookup(&record.cosbah)?,
            cos_ahd: lookup(&record.cosahd)?,
            chi_amplitude: record.chi,
            fade: FadeInterval::new(record.fade_min, record.fade_max),
        };
        rows.insert((record.donor, record.acceptor, record.separation), params);
    }
    Ok(rows)
}
