use crate::cli::MethodArgs;
use crate::error::{CliError, Result};
use hbscore::core::forcefield::params::HBondDatabase;
use hbscore::core::forcefield::term::EnergyMap;
use hbscore::core::topology::registry::ChemistryRegistry;
use hbscore::engine::config::EngineConfig;
use hbscore::engine::error::EngineError;
use hbscore::engine::method::HBondEnergy;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything a command needs to score: the method, its weights and the
/// chemistry to type donors and acceptors with.
pub struct ResolvedMethod {
    pub method: HBondEnergy,
    pub weights: EnergyMap,
    pub chemistry: ChemistryRegistry,
}

impl MethodArgs {
    /// Merges the config file, `--set` values and flag overrides, in that
    /// order, and loads the parameter tables.
    pub fn resolve(&self) -> Result<ResolvedMethod> {
        let mut table = match &self.config {
            Some(path) => read_table(path)?,
            None => toml::Table::new(),
        };
        apply_set_values(&mut table, &self.set_values)?;
        self.apply_flags(&mut table)?;

        let config: EngineConfig = toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| CliError::Config(e.to_string()))?;
        config
            .hbond
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        debug!("Final method options: {:?}", config.hbond);

        let database = match (&self.polynomials, &self.evaluations) {
            (Some(polynomials), Some(evaluations)) => {
                info!("Loading hydrogen-bond parameters from {:?} and {:?}", polynomials, evaluations);
                HBondDatabase::load(polynomials, evaluations).map_err(EngineError::from)?
            }
            _ => HBondDatabase::standard().map_err(EngineError::from)?,
        };
        let chemistry = match &self.chemistry {
            Some(path) => {
                info!("Loading residue chemistry from {:?}", path);
                ChemistryRegistry::load(path)?
            }
            None => ChemistryRegistry::standard()?,
        };

        Ok(ResolvedMethod {
            weights: config.weights(),
            method: HBondEnergy::new(config.hbond, Arc::new(database)),
            chemistry,
        })
    }

    fn apply_flags(&self, table: &mut toml::Table) -> Result<()> {
        let overrides = [
            ("decompose-bb-hb-into-pair-energies", self.decompose, true),
            ("bb-donor-acceptor-check", self.no_bb_check, false),
            ("use-hb-env-dep", self.no_env_dep, false),
        ];
        for (key, set, value) in overrides {
            if set {
                section_table(table, "hbond")?.insert(key.to_string(), toml::Value::Boolean(value));
            }
        }
        Ok(())
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    debug!("Loading configuration from file: {:?}", path);
    let content = std::fs::read_to_string(path)?;
    content.parse::<toml::Table>().map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn section_table<'a>(table: &'a mut toml::Table, section: &str) -> Result<&'a mut toml::Table> {
    table
        .entry(section)
        .or_insert_with(|| toml::Value::Table(toml::Table::new()))
        .as_table_mut()
        .ok_or_else(|| CliError::Config(format!("'{}' must be a table", section)))
}

/// Applies `SECTION.KEY=VALUE` overrides. Values are read as TOML scalars,
/// falling back to a plain string (`hbond.membrane=implicit`).
fn apply_set_values(table: &mut toml::Table, set_values: &[String]) -> Result<()> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let Some((section, name)) = key.split_once('.') else {
            return Err(CliError::Config(format!(
                "Invalid --set key: '{}'. Expected SECTION.KEY (e.g. hbond.max-hb-energy).",
                key
            )));
        };
        if !matches!(section, "hbond" | "weights") {
            return Err(CliError::Config(format!(
                "Unsupported configuration section for --set: '{}'",
                section
            )));
        }
        section_table(table, section)?.insert(name.to_string(), parse_scalar(value_str));
    }
    Ok(())
}

fn parse_scalar(value: &str) -> toml::Value {
    let value = value.trim();
    if let Ok(b) = value.parse::<bool>() {
        toml::Value::Boolean(b)
    } else if let Ok(i) = value.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = value.parse::<f64>() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(value.to_string())
    }
}
