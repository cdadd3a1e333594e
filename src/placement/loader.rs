//! Building catalog loader and watcher.
//!
//! Templates come from RON files under `data/buildings`, one template per
//! file. When the directory is missing or holds nothing usable the catalog
//! falls back to a small built-in set so build mode always has something to
//! offer.

use super::{BuildingTemplate, Footprint};
use crate::block::ResourceKind;
use crate::ron_loader::{load_ron_files, setup_ron_watcher};
use bevy::log::{info, warn};
use bevy::prelude::{Res, ResMut, Resource};
use std::collections::BTreeMap;

/// Directory scanned for building template files.
pub const BUILDINGS_DIR: &str = "data/buildings";

#[derive(Resource)]
pub struct BuildingWatcher(pub crate::ron::RonWatcher);

impl BuildingWatcher {
    #[must_use]
    pub fn stub() -> Self {
        BuildingWatcher(crate::ron::RonWatcher::stub())
    }
}

/// Ordered list of building templates; order is the build-mode cycle order.
#[derive(Resource, Debug, Clone)]
pub struct BuildingCatalog {
    templates: Vec<BuildingTemplate>,
}

impl BuildingCatalog {
    /// Catalog from templates, dropping later duplicates of a `kind`.
    #[must_use]
    pub fn new(templates: Vec<BuildingTemplate>) -> Self {
        let mut kept: Vec<BuildingTemplate> = Vec::with_capacity(templates.len());
        for t in templates {
            if kept.iter().any(|k| k.kind == t.kind) {
                warn!("duplicate building kind '{}' ignored", t.kind);
                continue;
            }
            kept.push(t);
        }
        Self { templates: kept }
    }

    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&BuildingTemplate> {
        self.templates.iter().find(|t| t.kind == kind)
    }

    /// Template at `index`, wrapping around.
    #[must_use]
    pub fn cycle(&self, index: usize) -> Option<&BuildingTemplate> {
        if self.templates.is_empty() {
            return None;
        }
        self.templates.get(index % self.templates.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildingTemplate> {
        self.templates.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for BuildingCatalog {
    fn default() -> Self {
        let template = |kind: &str, name: &str, cost: &[(ResourceKind, u32)], bonus: u32, w: i32, d: i32| {
            BuildingTemplate {
                kind: kind.to_string(),
                name: name.to_string(),
                cost: cost.iter().copied().collect::<BTreeMap<_, _>>(),
                population_bonus: bonus,
                footprint: Footprint::new(w, d),
            }
        };
        Self::new(vec![
            template("burrow", "Burrow", &[(ResourceKind::Soil, 4)], 2, 1, 1),
            template("granary", "Granary", &[(ResourceKind::Soil, 6), (ResourceKind::Stone, 2)], 0, 2, 2),
            template("shrine", "Relic Shrine", &[(ResourceKind::Stone, 4), (ResourceKind::Relic, 1)], 4, 2, 2),
            template("pipe_lodge", "Pipe Lodge", &[(ResourceKind::Pipestone, 3), (ResourceKind::Stone, 3)], 6, 3, 2),
        ])
    }
}

/// Load templates from a directory, or the built-in set if none parse.
#[must_use]
pub fn load_buildings_from_dir(path: &str) -> BuildingCatalog {
    let templates: Vec<BuildingTemplate> = load_ron_files(path);
    if templates.is_empty() {
        warn!("no building templates found in {path}, using built-in catalog");
        return BuildingCatalog::default();
    }
    BuildingCatalog::new(templates)
}

/// Create a watcher for the building template directory.
///
/// # Errors
/// Propagates the `notify::Error` if the directory cannot be watched.
pub fn setup_building_watcher(path: &str) -> Result<BuildingWatcher, notify::Error> {
    setup_ron_watcher(path).map(BuildingWatcher)
}

/// Reload the catalog resource when template files change.
#[allow(clippy::needless_pass_by_value)]
pub fn check_building_changes(watcher: Res<BuildingWatcher>, mut catalog: ResMut<BuildingCatalog>) {
    if watcher.0.take_changed() {
        *catalog = load_buildings_from_dir(BUILDINGS_DIR);
        info!("building catalog reloaded ({} templates)", catalog.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_cycles() {
        let catalog = BuildingCatalog::default();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.cycle(0).map(|t| t.kind.as_str()), Some("burrow"));
        assert_eq!(catalog.cycle(5).map(|t| t.kind.as_str()), Some("granary"));
        assert!(BuildingCatalog::new(Vec::new()).cycle(0).is_none());
    }

    #[test]
    fn duplicate_kinds_keep_the_first() {
        let mut a = BuildingCatalog::default().get("burrow").cloned().unwrap();
        let mut b = a.clone();
        a.name = "First".into();
        b.name = "Second".into();
        let catalog = BuildingCatalog::new(vec![a, b]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("burrow").unwrap().name, "First");
    }

    #[test]
    fn shipped_building_files_parse() {
        let catalog = load_buildings_from_dir(BUILDINGS_DIR);
        let granary = catalog.get("granary").expect("granary template");
        assert_eq!(granary.footprint, Footprint::new(2, 2));
        assert!(granary.cost.contains_key(&ResourceKind::Soil));
    }

    #[test]
    fn missing_directory_falls_back_to_builtins() {
        let catalog = load_buildings_from_dir("data/does-not-exist");
        assert_eq!(catalog.len(), BuildingCatalog::default().len());
    }
}
