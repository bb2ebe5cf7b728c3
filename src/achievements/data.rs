//! Shipped achievement definitions.

use super::types::AchievementCatalog;
use crate::sync::error::SyncError;
use std::fs;
use std::path::Path;

/// Catalog bundled with the binary, used when no game-specific file is given.
pub const BUNDLED_CATALOG_JSON: &str = include_str!("../../data/achievements.json");

/// Load a catalog from raw definitions, reset to shipped defaults.
pub fn load_catalog(raw: &str) -> Result<AchievementCatalog, SyncError> {
    Ok(AchievementCatalog::from_json(raw)?.shipped_defaults())
}

/// Load a catalog from a definitions file on disk.
pub fn load_catalog_file(path: &Path) -> Result<AchievementCatalog, SyncError> {
    let raw = fs::read_to_string(path)?;
    load_catalog(&raw)
}

/// The bundled catalog as shipped.
pub fn bundled_catalog() -> Result<AchievementCatalog, SyncError> {
    load_catalog(BUNDLED_CATALOG_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bundled_catalog_parses() {
        let catalog = bundled_catalog().unwrap();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.unlocked_count(), 0);
    }

    #[test]
    fn test_bundled_ids_unique() {
        let catalog = bundled_catalog().unwrap();
        let ids: HashSet<_> = catalog.ids().collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_bundled_dependencies_exist() {
        let catalog = bundled_catalog().unwrap();
        for a in &catalog.achievements {
            if let Some(dep) = &a.dependency {
                assert!(catalog.find(dep).is_some(), "{} depends on {}", a.id, dep);
            }
        }
    }

    #[test]
    fn test_load_catalog_resets_state() {
        let catalog = load_catalog(
            r#"{"achievements":[{"id":"A","unlock":1,"unlockProgress":3,"unlockedOn":"x"}]}"#,
        )
        .unwrap();
        let a = catalog.find("A").unwrap();
        assert!(!a.is_unlocked());
        assert_eq!(a.unlock_progress, 0);
        assert!(a.unlocked_on.is_none());
    }

    #[test]
    fn test_load_catalog_rejects_malformed() {
        assert!(matches!(
            load_catalog("{\"achievements\": 5}"),
            Err(SyncError::ParseFailed(_))
        ));
    }

    #[test]
    fn test_load_catalog_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_catalog_file(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(SyncError::Io(_))));
    }
}
