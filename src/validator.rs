use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::company::{CompanyIntel, Round};
use crate::config::ScoringRules;
use crate::content::{
    Checklist, ChecklistItem, DayPlan, Difficulty, Plan, Question, GENERAL_CATEGORY,
};
use crate::data::{
    new_entry_id, now_timestamp, AnalysisEntry, Confidence, ExtractedSkills, SkillConfidenceMap,
    DEFAULT_SKILLS,
};
use crate::scoring::{MAX_SCORE, MIN_SCORE};
use crate::skills::{DetectedSkills, SkillCategory};

/// Score assumed for stored entries that carry none.
pub const DEFAULT_SCORE: i32 = 50;

const DEFAULT_ROUND_WHY: &str = "Evaluates technical capability";

/// Key renames from layouts written before entries were normalized.
/// (legacy key, current key)
const LEGACY_KEY_RENAMES: &[(&str, &str)] = &[
    ("detectedSkills", "extractedSkills"),
    ("preparationChecklist", "checklist"),
    ("sevenDayPlan", "plan7Days"),
    ("interviewQuestions", "questions"),
    ("detected", "detectedCategories"),
];

const LEGACY_SCORE_KEY: &str = "readinessScore";

#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    /// The stored value is not shaped like an entry at all.
    #[error("malformed entry: {0}")]
    Malformed(String),

    /// The entry decoded but failed validation.
    #[error("invalid entry: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfidenceError {
    #[error("skillConfidenceMap must be object")]
    NotAnObject,

    #[error("skillConfidenceMap.{skill} must be \"know\" or \"practice\"")]
    InvalidLevel { skill: String },

    #[error("skill '{skill}' was not detected in this analysis")]
    UnknownSkill { skill: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JdInputCheck {
    pub is_valid: bool,
    pub message: String,
    /// Characters after trimming
    pub length: usize,
    pub warning: bool,
}

/// Empty JDs are rejected; short ones are accepted with a warning.
pub fn validate_jd_input(jd_text: &str, rules: &ScoringRules) -> JdInputCheck {
    let length = jd_text.trim().chars().count();

    if length == 0 {
        return JdInputCheck {
            is_valid: false,
            message: "Job description cannot be empty".to_string(),
            length: 0,
            warning: false,
        };
    }

    if length < rules.min_jd_length {
        return JdInputCheck {
            is_valid: true,
            message: format!(
                "This JD is too short to analyze deeply ({} chars). Paste full JD for better output.",
                length
            ),
            length,
            warning: true,
        };
    }

    JdInputCheck {
        is_valid: true,
        message: "Valid JD input".to_string(),
        length,
        warning: false,
    }
}

/// Analyzer output before it becomes a canonical entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnalysis {
    pub company: String,
    pub role: String,
    pub jd_text: String,
    pub detected_skills: DetectedSkills,
    pub detected_categories: Vec<SkillCategory>,
    pub base_score: i32,
    pub checklist: Checklist,
    pub plan_7_days: Plan,
    pub questions: Vec<Question>,
    pub company_intel: CompanyIntel,
}

/// Every shape `create_analysis_entry` accepts.
#[derive(Debug, Clone)]
pub enum EntryInput<'a> {
    Fresh(RawAnalysis),
    Stored(&'a Value),
}

/// On-disk layouts of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredLayout {
    Current,
    /// Written before normalization: `detectedSkills`, `readinessScore`,
    /// `preparationChecklist`, `sevenDayPlan`, `interviewQuestions`, `detected`
    Legacy,
}

impl StoredLayout {
    pub fn detect(map: &Map<String, Value>) -> Self {
        let has_legacy_key = map.contains_key(LEGACY_SCORE_KEY)
            || LEGACY_KEY_RENAMES
                .iter()
                .any(|(legacy, _)| map.contains_key(*legacy));

        if has_legacy_key {
            StoredLayout::Legacy
        } else {
            StoredLayout::Current
        }
    }
}

/// Rewrite legacy keys to the current layout. Current keys win when both are
/// present. `readinessScore` only fills a missing `baseScore`/`finalScore`,
/// since older views overwrote it with the live score.
pub fn migrate_legacy(mut map: Map<String, Value>) -> Map<String, Value> {
    for (legacy, current) in LEGACY_KEY_RENAMES {
        if let Some(value) = map.remove(*legacy) {
            map.entry(current.to_string()).or_insert(value);
        }
    }

    if let Some(readiness) = map.remove(LEGACY_SCORE_KEY) {
        for key in ["baseScore", "finalScore"] {
            if !map.get(key).is_some_and(Value::is_number) {
                map.insert(key.to_string(), readiness.clone());
            }
        }
    }

    map.remove("timestamp");
    map
}

/// Build a canonical entry from a fresh analysis or a stored value.
///
/// Missing fields get defaults; generated content is repaired. Fields with the
/// wrong type are reported as `EntryError::Invalid` rather than coerced.
pub fn create_analysis_entry(input: EntryInput) -> Result<AnalysisEntry, EntryError> {
    match input {
        EntryInput::Fresh(raw) => Ok(entry_from_analysis(raw)),
        EntryInput::Stored(value) => {
            let map = value
                .as_object()
                .ok_or_else(|| EntryError::Malformed(format!("expected object, got {}", kind(value))))?;

            let map = match StoredLayout::detect(map) {
                StoredLayout::Current => map.clone(),
                StoredLayout::Legacy => migrate_legacy(map.clone()),
            };
            entry_from_stored(&map)
        }
    }
}

fn entry_from_analysis(raw: RawAnalysis) -> AnalysisEntry {
    let now = now_timestamp();

    AnalysisEntry {
        id: new_entry_id(),
        created_at: now.clone(),
        updated_at: now,
        company: raw.company,
        role: raw.role,
        jd_text: raw.jd_text,
        extracted_skills: ExtractedSkills::from_detected(&raw.detected_skills),
        detected_categories: raw.detected_categories,
        base_score: raw.base_score,
        final_score: raw.base_score,
        skill_confidence_map: SkillConfidenceMap::new(),
        round_mapping: raw.company_intel.round_mapping.clone(),
        checklist: raw.checklist,
        plan_7_days: raw.plan_7_days,
        questions: raw.questions,
        company_intel: Some(raw.company_intel),
    }
}

fn entry_from_stored(map: &Map<String, Value>) -> Result<AnalysisEntry, EntryError> {
    let mut errors = Vec::new();

    let id = match map.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(n)) => n.to_string(),
        None | Some(Value::Null) => new_entry_id(),
        Some(_) => {
            errors.push("Missing or invalid id".to_string());
            String::new()
        }
    };

    let created_at = string_field(map, "createdAt", &mut errors).unwrap_or_else(now_timestamp);
    let updated_at =
        string_field(map, "updatedAt", &mut errors).unwrap_or_else(|| created_at.clone());
    let company = string_field(map, "company", &mut errors).unwrap_or_default();
    let role = string_field(map, "role", &mut errors).unwrap_or_default();
    let jd_text = string_field(map, "jdText", &mut errors).unwrap_or_default();

    let extracted_skills = map
        .get("extractedSkills")
        .map(normalize_extracted_skills)
        .unwrap_or_default();

    let detected_categories = match map.get("detectedCategories") {
        Some(Value::Array(labels)) => labels
            .iter()
            .filter_map(Value::as_str)
            .filter_map(SkillCategory::from_label)
            .collect(),
        _ => extracted_skills.detected_categories(),
    };

    let base_score = score_field(map, "baseScore", &mut errors).unwrap_or(DEFAULT_SCORE);
    let final_score = score_field(map, "finalScore", &mut errors).unwrap_or(base_score);

    let skill_confidence_map = match map.get("skillConfidenceMap") {
        None | Some(Value::Null) => SkillConfidenceMap::new(),
        Some(value) => parse_confidence_map(value).unwrap_or_else(|e| {
            errors.push(e.to_string());
            SkillConfidenceMap::new()
        }),
    };

    let company_intel = map.get("companyIntel").and_then(normalize_company_intel);

    let round_mapping = match map.get("roundMapping") {
        Some(rounds) => normalize_round_mapping(rounds),
        None => company_intel
            .as_ref()
            .map(|intel| intel.round_mapping.clone())
            .unwrap_or_default(),
    };

    if !errors.is_empty() {
        return Err(EntryError::Invalid(errors));
    }

    Ok(AnalysisEntry {
        id,
        created_at,
        updated_at,
        company,
        role,
        jd_text,
        extracted_skills,
        detected_categories,
        base_score,
        final_score,
        skill_confidence_map,
        round_mapping,
        checklist: map.get("checklist").map(normalize_checklist).unwrap_or_default(),
        plan_7_days: map.get("plan7Days").map(normalize_7_day_plan).unwrap_or_default(),
        questions: map.get("questions").map(normalize_questions).unwrap_or_default(),
        company_intel,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `None` when absent or null; records an error when present with another type.
fn string_field(map: &Map<String, Value>, key: &str, errors: &mut Vec<String>) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(format!("{} must be string", key));
            None
        }
    }
}

fn score_field(map: &Map<String, Value>, key: &str, errors: &mut Vec<String>) -> Option<i32> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => match score_from_value(value) {
            Some(score) => Some(score),
            None => {
                errors.push(format!("{} must be number between 0-100", key));
                None
            }
        },
    }
}

/// Numeric JSON value as a whole score. Fractions are rounded; non-numbers and
/// values outside i32 yield `None`.
pub fn score_from_value(value: &Value) -> Option<i32> {
    if let Some(n) = value.as_i64() {
        return i32::try_from(n).ok();
    }
    let n = value.as_f64()?.round();
    if n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX) {
        Some(n as i32)
    } else {
        None
    }
}

pub fn parse_confidence_map(value: &Value) -> Result<SkillConfidenceMap, ConfidenceError> {
    let map = value.as_object().ok_or(ConfidenceError::NotAnObject)?;

    map.iter()
        .map(|(skill, level)| {
            let confidence = match level.as_str() {
                Some("know") => Confidence::Know,
                Some("practice") => Confidence::Practice,
                _ => {
                    return Err(ConfidenceError::InvalidLevel {
                        skill: skill.clone(),
                    })
                }
            };
            Ok((skill.clone(), confidence))
        })
        .collect()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Accepts buckets under canonical keys (`coreCS`) or category labels (`Core CS`).
fn normalize_extracted_skills(value: &Value) -> ExtractedSkills {
    let Some(map) = value.as_object() else {
        return ExtractedSkills::default();
    };

    let mut skills = ExtractedSkills::default();
    for category in SkillCategory::ALL {
        let bucket = map
            .get(category.key())
            .or_else(|| map.get(category.label()));
        *skills.bucket_mut(category) = string_list(bucket);
    }
    skills.other = string_list(map.get("other"));
    skills
}

/// Drops rounds without a title or focus list and renumbers the rest from 1.
fn normalize_round_mapping(value: &Value) -> Vec<Round> {
    let Some(rounds) = value.as_array() else {
        return Vec::new();
    };

    rounds
        .iter()
        .filter_map(Value::as_object)
        .filter(|r| r.get("title").is_some_and(Value::is_string))
        .filter(|r| r.get("focus").is_some_and(Value::is_array))
        .zip(1..)
        .map(|(r, number)| Round {
            number,
            title: r
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            description: text_or(r.get("description"), ""),
            focus: string_list(r.get("focus")),
            duration: text_or(r.get("duration"), ""),
            why: text_or(r.get("why"), DEFAULT_ROUND_WHY),
        })
        .collect()
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn normalize_checklist(value: &Value) -> Checklist {
    let Some(rounds) = value.as_object() else {
        return Checklist::new();
    };

    rounds
        .iter()
        .filter_map(|(round, items)| {
            let items = items.as_array()?;
            let items = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(ChecklistItem {
                        text: text.clone(),
                        completed: false,
                    }),
                    Value::Object(obj) => Some(ChecklistItem {
                        text: text_or(obj.get("text"), ""),
                        completed: obj.get("completed") == Some(&Value::Bool(true)),
                    }),
                    _ => None,
                })
                .collect();
            Some((round.clone(), items))
        })
        .collect()
}

fn normalize_7_day_plan(value: &Value) -> Plan {
    let Some(days) = value.as_object() else {
        return Plan::new();
    };

    days.iter()
        .filter_map(|(day, config)| {
            let config = config.as_object()?;
            let focus = string_list(config.get("focus"))
                .iter()
                .filter_map(|label| SkillCategory::from_label(label))
                .collect();
            let plan = DayPlan {
                focus,
                tasks: string_list(config.get("tasks")),
            };
            Some((day.clone(), plan))
        })
        .collect()
}

/// Accepts plain question strings (older layout) or question objects.
fn normalize_questions(value: &Value) -> Vec<Question> {
    let Some(questions) = value.as_array() else {
        return Vec::new();
    };

    questions
        .iter()
        .filter_map(|q| match q {
            Value::String(text) => Some(Question {
                question: text.clone(),
                category: GENERAL_CATEGORY.to_string(),
                difficulty: Difficulty::Medium,
            }),
            Value::Object(obj) => Some(Question {
                question: text_or(obj.get("question"), ""),
                category: text_or(obj.get("category"), GENERAL_CATEGORY),
                difficulty: obj
                    .get("difficulty")
                    .and_then(|d| serde_json::from_value(d.clone()).ok())
                    .unwrap_or(Difficulty::Medium),
            }),
            _ => None,
        })
        .filter(|q| !q.question.is_empty())
        .collect()
}

/// Undecodable or empty bundles are dropped; the entry keeps its own rounds.
fn normalize_company_intel(value: &Value) -> Option<CompanyIntel> {
    let mut fields = value.as_object().filter(|m| !m.is_empty())?.clone();
    let rounds = fields.remove("roundMapping");

    match serde_json::from_value::<CompanyIntel>(Value::Object(fields)) {
        Ok(mut intel) => {
            intel.round_mapping = rounds
                .as_ref()
                .map(normalize_round_mapping)
                .unwrap_or_default();
            Some(intel)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Dropping undecodable companyIntel");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Check required fields and score bounds. Generated content is not inspected.
pub fn validate_analysis_entry(entry: &AnalysisEntry) -> ValidationReport {
    let mut errors = Vec::new();

    if entry.id.trim().is_empty() {
        errors.push("Missing or invalid id".to_string());
    }
    if chrono::DateTime::parse_from_rfc3339(&entry.created_at).is_err() {
        errors.push("Missing or invalid createdAt".to_string());
    }
    if entry.jd_text.is_empty() {
        errors.push("Missing or invalid jdText".to_string());
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&entry.base_score) {
        errors.push("baseScore must be number between 0-100".to_string());
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&entry.final_score) {
        errors.push("finalScore must be number between 0-100".to_string());
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Fill the `other` bucket with placeholder skills when no category matched.
pub fn ensure_valid_skills(entry: &mut AnalysisEntry) {
    if !entry.extracted_skills.has_category_skills() {
        entry.extracted_skills.other = DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect();
    }
}

/// Normalize and validate one stored entry. Nothing beyond the defaults of
/// `create_analysis_entry` is recovered.
pub fn sanitize_history_entry(raw: &Value) -> Result<AnalysisEntry, EntryError> {
    let mut entry = create_analysis_entry(EntryInput::Stored(raw))?;

    let report = validate_analysis_entry(&entry);
    if !report.is_valid {
        return Err(EntryError::Invalid(report.errors));
    }

    ensure_valid_skills(&mut entry);
    Ok(entry)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedHistory {
    pub valid: Vec<AnalysisEntry>,
    pub invalid: usize,
}

/// Partition stored entries into canonical ones (order kept) and a drop count.
/// Only the first entry with a given id is kept; later ones count as invalid.
pub fn validate_and_clean_history(raw: &[Value]) -> CleanedHistory {
    let mut valid = Vec::with_capacity(raw.len());
    let mut seen_ids = HashSet::with_capacity(raw.len());
    let mut invalid = 0;

    for (index, value) in raw.iter().enumerate() {
        match sanitize_history_entry(value) {
            Ok(entry) => {
                if seen_ids.insert(entry.id.clone()) {
                    valid.push(entry);
                } else {
                    tracing::warn!(index, id = %entry.id, "Skipping duplicate history entry id");
                    invalid += 1;
                }
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping corrupted history entry");
                invalid += 1;
            }
        }
    }

    CleanedHistory { valid, invalid }
}
