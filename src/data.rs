use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::company::{CompanyIntel, Round};
use crate::content::{Checklist, Plan, Question};
use crate::skills::{DetectedSkills, SkillCategory};

/// Placeholder skills shown when nothing was detected.
pub const DEFAULT_SKILLS: [&str; 4] = ["Communication", "Problem solving", "Basic coding", "Projects"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Know,
    Practice,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Know => "know",
            Confidence::Practice => "practice",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Confidence::Know => Confidence::Practice,
            Confidence::Practice => Confidence::Know,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Skill keyword (as detected) to the user's self-assessment, in the order
/// skills were first rated. Skills absent from the map display as "practice"
/// but do not affect the score.
pub type SkillConfidenceMap = IndexMap<String, Confidence>;

/// Detected skills keyed by fixed bucket names. Every bucket is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSkills {
    #[serde(rename = "coreCS")]
    pub core_cs: Vec<String>,
    pub languages: Vec<String>,
    pub web: Vec<String>,
    pub data: Vec<String>,
    pub cloud: Vec<String>,
    pub testing: Vec<String>,
    pub other: Vec<String>,
}

impl ExtractedSkills {
    pub fn from_detected(detected: &DetectedSkills) -> Self {
        let mut skills = Self::default();
        for (category, found) in detected {
            *skills.bucket_mut(*category) = found.clone();
        }
        skills
    }

    pub fn bucket(&self, category: SkillCategory) -> &[String] {
        match category {
            SkillCategory::CoreCs => &self.core_cs,
            SkillCategory::Languages => &self.languages,
            SkillCategory::Web => &self.web,
            SkillCategory::Data => &self.data,
            SkillCategory::CloudDevOps => &self.cloud,
            SkillCategory::Testing => &self.testing,
        }
    }

    pub fn bucket_mut(&mut self, category: SkillCategory) -> &mut Vec<String> {
        match category {
            SkillCategory::CoreCs => &mut self.core_cs,
            SkillCategory::Languages => &mut self.languages,
            SkillCategory::Web => &mut self.web,
            SkillCategory::Data => &mut self.data,
            SkillCategory::CloudDevOps => &mut self.cloud,
            SkillCategory::Testing => &mut self.testing,
        }
    }

    /// True when any of the six fixed buckets is non-empty (`other` ignored).
    pub fn has_category_skills(&self) -> bool {
        SkillCategory::ALL
            .iter()
            .any(|category| !self.bucket(*category).is_empty())
    }

    /// Categories with at least one skill, in table order.
    pub fn detected_categories(&self) -> Vec<SkillCategory> {
        SkillCategory::ALL
            .into_iter()
            .filter(|category| !self.bucket(*category).is_empty())
            .collect()
    }

    /// All skills including the `other` bucket, grouped by bucket.
    pub fn all_skills(&self) -> impl Iterator<Item = &String> {
        SkillCategory::ALL
            .into_iter()
            .flat_map(move |category| self.bucket(category).iter())
            .chain(self.other.iter())
    }
}

/// Canonical persisted analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEntry {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub company: String,
    pub role: String,
    pub jd_text: String,
    pub extracted_skills: ExtractedSkills,
    pub detected_categories: Vec<SkillCategory>,
    /// Fixed at analysis time; never recomputed from later state
    pub base_score: i32,
    pub final_score: i32,
    pub skill_confidence_map: SkillConfidenceMap,
    pub round_mapping: Vec<Round>,
    pub checklist: Checklist,
    #[serde(rename = "plan7Days")]
    pub plan_7_days: Plan,
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_intel: Option<CompanyIntel>,
}

impl AnalysisEntry {
    /// Skills marked "practice", in the order they were first rated, capped
    /// at `limit`.
    pub fn weak_skills(&self, limit: usize) -> Vec<&str> {
        self.skill_confidence_map
            .iter()
            .filter(|(_, confidence)| **confidence == Confidence::Practice)
            .take(limit)
            .map(|(skill, _)| skill.as_str())
            .collect()
    }

    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }
}

/// Time-ordered opaque id.
pub fn new_entry_id() -> String {
    Uuid::now_v7().to_string()
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Confidence::Know).unwrap(), r#""know""#);
        let parsed: Confidence = serde_json::from_str(r#""practice""#).unwrap();
        assert_eq!(parsed, Confidence::Practice);
    }

    #[test]
    fn test_confidence_toggle() {
        assert_eq!(Confidence::Know.toggled(), Confidence::Practice);
        assert_eq!(Confidence::Practice.toggled(), Confidence::Know);
    }

    #[test]
    fn test_extracted_skills_from_detected() {
        let mut detected = DetectedSkills::new();
        detected.insert(SkillCategory::Web, vec!["react".into()]);
        detected.insert(SkillCategory::CloudDevOps, vec!["docker".into()]);

        let skills = ExtractedSkills::from_detected(&detected);
        assert_eq!(skills.web, vec!["react"]);
        assert_eq!(skills.cloud, vec!["docker"]);
        assert!(skills.core_cs.is_empty());
        assert!(skills.other.is_empty());
        assert_eq!(
            skills.detected_categories(),
            vec![SkillCategory::Web, SkillCategory::CloudDevOps]
        );
    }

    #[test]
    fn test_extracted_skills_bucket_keys() {
        let value = serde_json::to_value(ExtractedSkills::default()).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        for key in ["coreCS", "languages", "web", "data", "cloud", "testing", "other"] {
            assert!(keys.contains(&key.to_string()), "missing bucket {}", key);
        }
    }

    #[test]
    fn test_has_category_skills_ignores_other() {
        let mut skills = ExtractedSkills::default();
        skills.other = vec!["Communication".into()];
        assert!(!skills.has_category_skills());

        skills.testing = vec!["qa".into()];
        assert!(skills.has_category_skills());
    }

    #[test]
    fn test_all_skills_includes_other() {
        let mut skills = ExtractedSkills::default();
        skills.data = vec!["sql".into()];
        skills.other = vec!["Projects".into()];
        let all: Vec<_> = skills.all_skills().cloned().collect();
        assert_eq!(all, vec!["sql", "Projects"]);
    }

    #[test]
    fn test_weak_skills_follow_rating_order() {
        let value = serde_json::json!({
            "id": "1",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-01T10:00:00.000Z",
            "company": "",
            "role": "",
            "jdText": "x",
            "extractedSkills": ExtractedSkills::default(),
            "detectedCategories": [],
            "baseScore": 50,
            "finalScore": 46,
            "skillConfidenceMap": {
                "sql": "practice",
                "react": "know",
                "docker": "practice",
                "aws": "practice",
                "css": "practice"
            },
            "roundMapping": [],
            "checklist": {},
            "plan7Days": {},
            "questions": []
        });
        let mut entry: AnalysisEntry = serde_json::from_value(value).unwrap();
        assert_eq!(entry.weak_skills(3), vec!["sql", "docker", "aws"]);

        // Re-rating keeps the original position
        entry
            .skill_confidence_map
            .insert("sql".to_string(), Confidence::Practice);
        entry
            .skill_confidence_map
            .insert("angular".to_string(), Confidence::Practice);
        assert_eq!(entry.weak_skills(3), vec!["sql", "docker", "aws"]);

        let encoded = serde_json::to_string(&entry).unwrap();
        let sql = encoded.find("\"sql\":\"practice\"").unwrap();
        let react = encoded.find("\"react\":\"know\"").unwrap();
        assert!(sql < react);
    }

    #[test]
    fn test_new_entry_ids_are_unique() {
        let a = new_entry_id();
        let b = new_entry_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_now_timestamp_is_rfc3339() {
        let ts = now_timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert!(ts.ends_with('Z'));
    }
}
