//! Recommended packages shipped with the application

use crate::daemon::{normalize_package_name, PackageRecord};
use anyhow::{Context, Result};
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../data/recomendados.json");

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<PackageRecord>,
}

impl Catalog {
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_CATALOG)
    }

    pub fn parse(json: &str) -> Result<Self> {
        let entries: Vec<PackageRecord> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing catalog {}", path.display()))
    }

    /// Configured file if given, the built-in list otherwise
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn entries(&self) -> &[PackageRecord] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&PackageRecord> {
        let name = normalize_package_name(name);
        self.entries.iter().find(|entry| entry.base_name() == name)
    }

    /// Catalog entry for `name`, or a bare record titled with the name
    pub fn record_for(&self, name: &str) -> PackageRecord {
        self.find(name)
            .cloned()
            .unwrap_or_else(|| PackageRecord::new(normalize_package_name(name)))
    }
}
