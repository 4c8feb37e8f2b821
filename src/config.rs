use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Point values and thresholds used by the readiness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub starting_score: i32,
    pub points_per_category: i32,
    pub category_points_cap: i32,
    pub company_points: i32,
    pub role_points: i32,
    pub detailed_jd_points: i32,
    /// Character count a JD must exceed to earn `detailed_jd_points`
    pub detailed_jd_threshold: usize,
    pub know_points: i32,
    pub practice_penalty: i32,
    /// Allowed drift between a stored and a recomputed base score
    pub tamper_tolerance: i32,
    /// Shorter JDs are accepted but flagged with a warning
    pub min_jd_length: usize,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            starting_score: 35,
            points_per_category: 5,
            category_points_cap: 30,
            company_points: 10,
            role_points: 10,
            detailed_jd_points: 10,
            detailed_jd_threshold: 800,
            know_points: 2,
            practice_penalty: 1,
            tamper_tolerance: 1,
            min_jd_length: 200,
        }
    }
}

/// Load scoring rules from a JSON file, or the defaults when no path is given.
/// Fields missing from the file keep their default values.
pub fn load_rules(path: Option<&Path>) -> Result<ScoringRules> {
    let Some(path) = path else {
        return Ok(ScoringRules::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scoring rules: {:?}", path))?;
    let rules: ScoringRules = serde_json::from_str(&content)
        .with_context(|| format!("Invalid scoring rules JSON: {:?}", path))?;

    tracing::debug!(path = ?path, "Loaded scoring rules");
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_rules_match_documented_formula() {
        let rules = ScoringRules::default();
        assert_eq!(rules.starting_score, 35);
        assert_eq!(rules.points_per_category, 5);
        assert_eq!(rules.category_points_cap, 30);
        assert_eq!(rules.company_points, 10);
        assert_eq!(rules.role_points, 10);
        assert_eq!(rules.detailed_jd_points, 10);
        assert_eq!(rules.detailed_jd_threshold, 800);
        assert_eq!(rules.know_points, 2);
        assert_eq!(rules.practice_penalty, 1);
        assert_eq!(rules.min_jd_length, 200);
    }

    #[test]
    fn test_load_rules_without_path_uses_defaults() {
        let rules = load_rules(None).unwrap();
        assert_eq!(rules, ScoringRules::default());
    }

    #[test]
    fn test_load_rules_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rules.json");
        fs::write(&path, r#"{"know_points": 3, "min_jd_length": 100}"#).unwrap();

        let rules = load_rules(Some(&path)).unwrap();
        assert_eq!(rules.know_points, 3);
        assert_eq!(rules.min_jd_length, 100);
        assert_eq!(rules.starting_score, 35);
    }

    #[test]
    fn test_load_rules_invalid_json_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rules.json");
        fs::write(&path, "not json").unwrap();

        assert!(load_rules(Some(&path)).is_err());
    }
}
