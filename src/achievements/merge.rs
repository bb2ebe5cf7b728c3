//! Folding remote unlocks and local progress into the catalog.

use super::types::{AchievementCatalog, UNLOCKED};

/// Merge the remote-confirmed unlocked ids and the locally stored progress
/// into `catalog`, returning the merged catalog.
///
/// Two order-preserving passes:
/// 1. every id in `remote_unlocked` marks the first matching entry unlocked;
///    ids with no catalog entry are ignored.
/// 2. every catalog entry takes `unlock_progress` from the matching entry in
///    `local_progress`; entries with no match keep their current value.
///
/// Both passes only assign externally supplied values, so reconciling the
/// result again with the same inputs changes nothing.
pub fn reconcile(
    catalog: &AchievementCatalog,
    remote_unlocked: &[String],
    local_progress: &AchievementCatalog,
) -> AchievementCatalog {
    let mut merged = catalog.clone();

    for id in remote_unlocked {
        if let Some(entry) = merged.find_mut(id) {
            entry.unlock = UNLOCKED;
        }
    }

    for entry in merged.achievements.iter_mut() {
        if let Some(local) = local_progress.find(&entry.id) {
            entry.unlock_progress = local.unlock_progress;
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::types::{Achievement, LOCKED};

    fn achievement(id: &str, requirement: i32) -> Achievement {
        Achievement {
            id: id.to_string(),
            unlock_requirement: requirement,
            ..Default::default()
        }
    }

    fn catalog() -> AchievementCatalog {
        AchievementCatalog {
            achievements: vec![
                achievement("A1", 10),
                achievement("A2", 5),
                achievement("A3", 1),
            ],
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unlock_pass_sets_matching_ids() {
        let c = catalog();
        let merged = reconcile(&c, &ids(&["A1", "A3"]), &c.shipped_defaults());
        assert!(merged.find("A1").unwrap().is_unlocked());
        assert_eq!(merged.find("A2").unwrap().unlock, LOCKED);
        assert!(merged.find("A3").unwrap().is_unlocked());
    }

    #[test]
    fn test_unknown_remote_ids_ignored() {
        let c = catalog();
        let merged = reconcile(&c, &ids(&["removed-long-ago"]), &c);
        assert_eq!(merged, c);
    }

    #[test]
    fn test_unlock_pass_never_relocks() {
        let mut c = catalog();
        c.achievements[1].unlock = UNLOCKED;
        let merged = reconcile(&c, &[], &c);
        assert!(merged.find("A2").unwrap().is_unlocked());
    }

    #[test]
    fn test_progress_pass_copies_local_values() {
        let c = catalog();
        let mut local = c.shipped_defaults();
        local.find_mut("A2").unwrap().unlock_progress = 3;
        let merged = reconcile(&c, &[], &local);
        assert_eq!(merged.find("A2").unwrap().unlock_progress, 3);
        assert_eq!(merged.find("A1").unwrap().unlock_progress, 0);
    }

    #[test]
    fn test_progress_pass_keeps_values_missing_locally() {
        let mut c = catalog();
        c.find_mut("A1").unwrap().unlock_progress = 7;
        let local = AchievementCatalog {
            achievements: vec![achievement("A2", 5)],
        };
        let merged = reconcile(&c, &[], &local);
        assert_eq!(merged.find("A1").unwrap().unlock_progress, 7);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let c = catalog();
        let mut local = c.shipped_defaults();
        local.find_mut("A1").unwrap().unlock_progress = 9;
        let remote = ids(&["A2", "nope"]);

        let once = reconcile(&c, &remote, &local);
        let twice = reconcile(&once, &remote, &local);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_preserves_catalog_order() {
        let c = catalog();
        let merged = reconcile(&c, &ids(&["A3", "A1"]), &c);
        let order: Vec<_> = merged.ids().collect();
        assert_eq!(order, vec!["A1", "A2", "A3"]);
    }

    #[test]
    fn test_first_run_bootstrap_is_noop_for_progress() {
        let c = catalog();
        let merged = reconcile(&c, &ids(&["A1"]), &c.shipped_defaults());
        let a1 = merged.find("A1").unwrap();
        assert!(a1.is_unlocked());
        assert_eq!(a1.unlock_progress, 0);
    }
}
