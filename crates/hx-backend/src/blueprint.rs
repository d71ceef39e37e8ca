//! Actor templates and the catalogue they are looked up in.

use std::collections::BTreeMap;

use glob::Pattern;

use crate::{BackendError, BackendResult};

/// A spawnable actor template (e.g. `vehicle.tesla.model3`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    pub id:         String,
    pub attributes: BTreeMap<String, String>,
}

impl Blueprint {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), attributes: BTreeMap::new() }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Shorthand for a vehicle blueprint carrying a `number_of_wheels` attribute.
    pub fn vehicle(id: impl Into<String>, wheels: u32) -> Self {
        Self::new(id).with_attribute("number_of_wheels", wheels.to_string())
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Parsed `number_of_wheels`; `None` when missing or not an integer.
    pub fn number_of_wheels(&self) -> Option<u32> {
        self.attribute("number_of_wheels")?.trim().parse().ok()
    }
}

/// The backend's blueprint catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintLibrary {
    blueprints: Vec<Blueprint>,
}

impl BlueprintLibrary {
    pub fn new(blueprints: Vec<Blueprint>) -> Self {
        Self { blueprints }
    }

    /// A small stock catalogue: cars, a van, a truck, two motorbikes and a
    /// bicycle, plus a couple of non-vehicle props.
    pub fn stock() -> Self {
        Self::new(vec![
            Blueprint::vehicle("vehicle.audi.a2", 4),
            Blueprint::vehicle("vehicle.tesla.model3", 4),
            Blueprint::vehicle("vehicle.lincoln.mkz_2020", 4),
            Blueprint::vehicle("vehicle.mercedes.sprinter", 4),
            Blueprint::vehicle("vehicle.carlamotors.carlacola", 4),
            Blueprint::vehicle("vehicle.yamaha.yzf", 2),
            Blueprint::vehicle("vehicle.kawasaki.ninja", 2),
            Blueprint::vehicle("vehicle.bh.crossbike", 2),
            Blueprint::new("static.prop.streetbarrier"),
            Blueprint::new("walker.pedestrian.0001"),
        ])
    }

    /// Blueprints whose id matches the shell-style `pattern`, in catalogue
    /// order.
    pub fn filter(&self, pattern: &str) -> BackendResult<Vec<Blueprint>> {
        let matcher = Pattern::new(pattern).map_err(|source| BackendError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self
            .blueprints
            .iter()
            .filter(|bp| matcher.matches(&bp.id))
            .cloned()
            .collect())
    }

    pub fn find(&self, id: &str) -> Option<&Blueprint> {
        self.blueprints.iter().find(|bp| bp.id == id)
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Blueprint> {
        self.blueprints.iter()
    }
}
