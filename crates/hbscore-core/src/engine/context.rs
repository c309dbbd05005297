use super::cache::TrieCollection;
use super::config::{HBondOptions, MembraneMode};
use super::error::EngineError;
use super::hbond_set::HBondSet;
use crate::core::forcefield::params::HBondDatabase;
use crate::core::models::membrane::MembraneGeometry;
use crate::core::models::system::MolecularSystem;
use tracing::debug;

/// Everything one scoring round derives from the structure before any pair
/// is evaluated.
///
/// The method itself stays immutable; the membrane geometry, the hydrogen-bond
/// set and the packing tries travel here instead.
#[derive(Debug, Clone, Default)]
pub struct ScoringContext {
    hbond_set: HBondSet,
    membrane: Option<MembraneGeometry>,
    minimizing: bool,
    tries: Option<TrieCollection>,
}

impl ScoringContext {
    /// Resolves the membrane and runs the backbone pass over `system`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingMembrane`] when framework membrane
    /// scoring is requested for a structure without membrane geometry.
    pub fn new(
        system: &MolecularSystem,
        options: &HBondOptions,
        database: &HBondDatabase,
    ) -> Result<Self, EngineError> {
        let membrane = resolve_membrane(system, options.membrane)?;
        let hbond_set = HBondSet::setup(system, options, database, membrane.as_ref());
        Ok(Self {
            hbond_set,
            membrane,
            minimizing: false,
            tries: None,
        })
    }

    #[inline]
    pub fn hbond_set(&self) -> &HBondSet {
        &self.hbond_set
    }

    #[inline]
    pub fn membrane(&self) -> Option<&MembraneGeometry> {
        self.membrane.as_ref()
    }

    #[inline]
    pub fn is_minimizing(&self) -> bool {
        self.minimizing
    }

    #[inline]
    pub fn tries(&self) -> Option<&TrieCollection> {
        self.tries.as_ref()
    }

    pub(crate) fn hbond_set_mut(&mut self) -> &mut HBondSet {
        &mut self.hbond_set
    }

    pub(crate) fn set_minimizing(&mut self, minimizing: bool) {
        self.minimizing = minimizing;
    }

    pub(crate) fn set_tries(&mut self, tries: TrieCollection) {
        self.tries = Some(tries);
    }

    pub(crate) fn tries_mut(&mut self) -> Option<&mut TrieCollection> {
        self.tries.as_mut()
    }
}

fn resolve_membrane(
    system: &MolecularSystem,
    mode: MembraneMode,
) -> Result<Option<MembraneGeometry>, EngineError> {
    let membrane = match mode {
        MembraneMode::None => None,
        MembraneMode::Implicit => Some(system.membrane().copied().unwrap_or_default()),
        MembraneMode::Framework => Some(
            system
                .membrane()
                .copied()
                .ok_or(EngineError::MissingMembrane)?,
        ),
    };
    if let Some(membrane) = &membrane {
        debug!(
            ?mode,
            thickness = membrane.thickness,
            steepness = membrane.steepness,
            "Scoring with membrane weights."
        );
    }
    Ok(membrane)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::HBondOptionsBuilder;
    use crate::engine::test_utils::{backbone_pair, database};
    use nalgebra::{Point3, Vector3};

    #[test]
    fn no_membrane_mode_ignores_system_membrane() {
        let mut fixture = backbone_pair(0, true, false);
        fixture.system.set_membrane(Some(MembraneGeometry::default()));
        let context = ScoringContext::new(&fixture.system, &HBondOptions::default(), &database()).unwrap();
        assert!(context.membrane().is_none());
        assert_eq!(context.hbond_set().nhbonds(), 1);
        assert!(!context.is_minimizing());
        assert!(context.tries().is_none());
    }

    #[test]
    fn implicit_membrane_falls_back_to_default_geometry() {
        let fixture = backbone_pair(0, true, false);
        let options = HBondOptionsBuilder::new()
            .membrane(MembraneMode::Implicit)
            .build()
            .unwrap();
        let context = ScoringContext::new(&fixture.system, &options, &database()).unwrap();
        assert_eq!(context.membrane(), Some(&MembraneGeometry::default()));
    }

    #[test]
    fn framework_membrane_uses_system_geometry_or_fails() {
        let mut fixture = backbone_pair(0, true, false);
        let options = HBondOptionsBuilder::new()
            .membrane(MembraneMode::Framework)
            .build()
            .unwrap();
        assert!(matches!(
            ScoringContext::new(&fixture.system, &options, &database()),
            Err(EngineError::MissingMembrane)
        ));

        let geometry = MembraneGeometry::new(Point3::new(0.0, 0.0, 5.0), Vector3::x(), 12.0, 8.0);
        fixture.system.set_membrane(Some(geometry));
        let context = ScoringContext::new(&fixture.system, &options, &database()).unwrap();
        assert_eq!(context.membrane(), Some(&geometry));
    }
}
