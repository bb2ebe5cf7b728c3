//! Achievement catalog types and data structures.

use serde::{Deserialize, Serialize};

/// `unlock` value for a locked achievement.
pub const LOCKED: i32 = 0;
/// `unlock` value for an unlocked achievement.
pub const UNLOCKED: i32 = 1;

/// One achievement definition plus its mutable unlock/progress fields.
///
/// Field names follow the service's camelCase JSON so the same type reads the
/// bundled catalog, the remote unlocked list and the persisted snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Achievement {
    pub id: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub points: i32,
    /// `LOCKED` or `UNLOCKED`.
    pub unlock: i32,
    pub unlock_progress: i32,
    pub unlock_requirement: i32,
    /// Prerequisite achievement id. Not enforced here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_on: Option<String>,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.unlock == UNLOCKED
    }

    /// True once `unlock_progress` has reached `unlock_requirement`.
    pub fn is_complete(&self) -> bool {
        self.unlock_progress >= self.unlock_requirement
    }

    /// Progress as a 0.0 - 100.0 percentage, capped at 100.
    pub fn progress_percentage(&self) -> f32 {
        if self.unlock_requirement <= 0 {
            return if self.is_unlocked() { 100.0 } else { 0.0 };
        }
        let pct = self.unlock_progress as f32 / self.unlock_requirement as f32 * 100.0;
        pct.clamp(0.0, 100.0)
    }
}

/// Ordered set of achievements for one game. Ids are expected to be unique;
/// lookups return the first match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AchievementCatalog {
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

impl AchievementCatalog {
    /// Parse a catalog from its JSON form (`{"achievements": [...]}`).
    ///
    /// Only structural parsing happens here; entries are not validated.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.achievements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.achievements.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Achievement> {
        self.achievements.iter_mut().find(|a| a.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.achievements.iter().map(|a| a.id.as_str())
    }

    pub fn unlocked_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.is_unlocked()).count()
    }

    /// Sum of points over unlocked achievements.
    pub fn total_points(&self) -> i64 {
        self.achievements
            .iter()
            .filter(|a| a.is_unlocked())
            .map(|a| a.points as i64)
            .sum()
    }

    /// Get count of unlocked/total by category.
    pub fn count_by_category(&self, category: &str) -> (usize, usize) {
        let in_category: Vec<_> = self
            .achievements
            .iter()
            .filter(|a| a.category == category)
            .collect();
        let unlocked = in_category.iter().filter(|a| a.is_unlocked()).count();
        (unlocked, in_category.len())
    }

    /// Copy of this catalog with every unlock/progress field reset, i.e. the
    /// catalog as shipped.
    pub fn shipped_defaults(&self) -> Self {
        let achievements = self
            .achievements
            .iter()
            .map(|a| Achievement {
                unlock: LOCKED,
                unlock_progress: 0,
                unlocked_on: None,
                ..a.clone()
            })
            .collect();
        Self { achievements }
    }

    /// This catalog's definitions with unlock/progress state carried over from
    /// `previous` for every id present in both. Definitions missing from
    /// `previous` keep their own state.
    pub fn with_state_from(&self, previous: &AchievementCatalog) -> Self {
        let achievements = self
            .achievements
            .iter()
            .map(|a| match previous.find(&a.id) {
                Some(prev) => Achievement {
                    unlock: prev.unlock,
                    unlock_progress: prev.unlock_progress,
                    unlocked_on: prev.unlocked_on.clone(),
                    ..a.clone()
                },
                None => a.clone(),
            })
            .collect();
        Self { achievements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AchievementCatalog {
        AchievementCatalog::from_json(
            r#"{"achievements":[
                {"id":"A1","category":"Breath","title":"First Puff","description":"Do a breath",
                 "points":5,"unlock":0,"unlockProgress":0,"unlockRequirement":1},
                {"id":"A2","category":"Breath","title":"Ten Puffs","description":"Do ten",
                 "points":20,"unlock":1,"unlockProgress":4,"unlockRequirement":10,"dependency":"A1"}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_camel_case_fields() {
        let catalog = sample();
        assert_eq!(catalog.len(), 2);
        let a2 = catalog.find("A2").unwrap();
        assert_eq!(a2.unlock_progress, 4);
        assert_eq!(a2.unlock_requirement, 10);
        assert_eq!(a2.dependency.as_deref(), Some("A1"));
        assert!(a2.is_unlocked());
    }

    #[test]
    fn test_missing_fields_default() {
        let catalog = AchievementCatalog::from_json(r#"{"achievements":[{"id":"X"}]}"#).unwrap();
        let x = catalog.find("X").unwrap();
        assert_eq!(x.unlock, LOCKED);
        assert_eq!(x.points, 0);
        assert!(x.unlocked_on.is_none());
    }

    #[test]
    fn test_counts_and_points() {
        let catalog = sample();
        assert_eq!(catalog.unlocked_count(), 1);
        assert_eq!(catalog.total_points(), 20);
        assert_eq!(catalog.count_by_category("Breath"), (1, 2));
        assert_eq!(catalog.count_by_category("Other"), (0, 0));
    }

    #[test]
    fn test_shipped_defaults_resets_state() {
        let shipped = sample().shipped_defaults();
        assert!(shipped
            .achievements
            .iter()
            .all(|a| a.unlock == LOCKED && a.unlock_progress == 0));
        assert_eq!(shipped.find("A2").unwrap().points, 20);
    }

    #[test]
    fn test_with_state_from_keeps_new_definitions() {
        let shipped = sample().shipped_defaults();
        let previous = AchievementCatalog {
            achievements: vec![Achievement {
                id: "A2".to_string(),
                title: "Old Title".to_string(),
                unlock: UNLOCKED,
                unlock_progress: 7,
                unlocked_on: Some("2026-01-01T00:00:00+00:00".to_string()),
                ..Default::default()
            }],
        };
        let carried = shipped.with_state_from(&previous);
        let a2 = carried.find("A2").unwrap();
        assert!(a2.is_unlocked());
        assert_eq!(a2.unlock_progress, 7);
        assert_eq!(a2.title, "Ten Puffs");
        assert_eq!(carried.find("A1").unwrap(), shipped.find("A1").unwrap());
    }

    #[test]
    fn test_progress_percentage() {
        let mut a = sample().find("A2").unwrap().clone();
        assert_eq!(a.progress_percentage(), 40.0);
        a.unlock_progress = 25;
        assert_eq!(a.progress_percentage(), 100.0);
        assert!(a.is_complete());
    }

    #[test]
    fn test_find_returns_first_match() {
        let mut catalog = sample();
        let mut dup = catalog.achievements[0].clone();
        dup.points = 99;
        catalog.achievements.push(dup);
        assert_eq!(catalog.find("A1").unwrap().points, 5);
    }
}
