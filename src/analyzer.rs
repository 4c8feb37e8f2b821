use thiserror::Error;

use crate::company::{
    generate_round_mapping, get_hiring_focus, infer_company_size, infer_industry, CompanyIntel,
    CompanySize,
};
use crate::config::ScoringRules;
use crate::content::{
    generate_7_day_plan, generate_interview_questions, generate_preparation_checklist,
};
use crate::data::{AnalysisEntry, Confidence};
use crate::scoring::{
    compare_scores, create_score_object, update_final_score, ScoreComparison, ScoreObject,
};
use crate::skills::extract_skills;
use crate::validator::{
    create_analysis_entry, ensure_valid_skills, ConfidenceError, EntryInput, RawAnalysis,
};

#[derive(Debug, Error, PartialEq)]
pub enum AnalyzeError {
    #[error("job description cannot be empty")]
    EmptyJobDescription,

    #[error("failed to build analysis entry: {0}")]
    Entry(#[from] crate::validator::EntryError),
}

/// Run the full analysis pipeline over one job description.
///
/// Performs no I/O; the caller persists the returned entry. `size_override`
/// replaces the name-based size inference.
pub fn analyze_jd(
    jd_text: &str,
    company: &str,
    role: &str,
    size_override: Option<CompanySize>,
    rules: &ScoringRules,
) -> Result<AnalysisEntry, AnalyzeError> {
    if jd_text.trim().is_empty() {
        return Err(AnalyzeError::EmptyJobDescription);
    }

    let extraction = extract_skills(jd_text);
    let categories = &extraction.detected_categories;

    let size = size_override.unwrap_or_else(|| infer_company_size(company));
    let company_intel = CompanyIntel {
        size,
        industry: infer_industry(jd_text, company),
        hiring_focus: get_hiring_focus(size),
        round_mapping: generate_round_mapping(size, &extraction.detected_skills, categories),
    };

    let score = create_score_object(jd_text, company, role, categories, rules);

    tracing::debug!(
        categories = categories.len(),
        size = %size,
        base_score = score.base_score,
        "JD analyzed"
    );

    let raw = RawAnalysis {
        company: company.to_string(),
        role: role.to_string(),
        jd_text: jd_text.to_string(),
        checklist: generate_preparation_checklist(categories),
        plan_7_days: generate_7_day_plan(categories),
        questions: generate_interview_questions(categories),
        detected_categories: categories.clone(),
        detected_skills: extraction.detected_skills,
        base_score: score.base_score,
        company_intel,
    };

    let mut entry = create_analysis_entry(EntryInput::Fresh(raw))?;
    ensure_valid_skills(&mut entry);

    Ok(entry)
}

/// Record the user's confidence for one detected skill and recompute the
/// final score from the stored base score.
pub fn apply_skill_confidence(
    entry: &mut AnalysisEntry,
    skill: &str,
    confidence: Confidence,
    rules: &ScoringRules,
) -> Result<ScoreComparison, ConfidenceError> {
    if !entry.extracted_skills.all_skills().any(|s| s == skill) {
        return Err(ConfidenceError::UnknownSkill {
            skill: skill.to_string(),
        });
    }

    let before = ScoreObject {
        base_score: entry.base_score,
        final_score: entry.final_score,
        initial_score: entry.base_score,
        last_updated: entry.updated_at.clone(),
    };
    entry
        .skill_confidence_map
        .insert(skill.to_string(), confidence);

    let after = update_final_score(&before, &entry.skill_confidence_map, rules);
    entry.final_score = after.final_score;
    entry.updated_at = after.last_updated;

    Ok(compare_scores(before.final_score, after.final_score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DEFAULT_SKILLS;
    use crate::scoring::ScoreTrend;
    use crate::skills::SkillCategory;

    const BACKEND_JD: &str = "Acme is hiring a Backend Engineer to build and run the services \
behind our mobile app. You will design schemas and write efficient SQL, own deployments that \
ship as Docker images, and pair with the React team on the internal dashboard. We value clear \
writing, calm debugging and ownership of what we ship. You will join a small group of five \
engineers who share on-call duty, review each other's changes, and plan work in short cycles. \
Day to day you will profile slow queries, keep our schema migrations safe, and make the build \
pipeline quicker for everyone. We care about readable code and honest feedback more than \
heroics. You should be comfortable reading unfamiliar code, asking questions early, and writing \
short design notes before large changes. Experience with message queues, caching layers, or \
event-driven billing flows is a plus but not required. We offer flexible hours, a yearly budget \
for books and conferences, and a quiet office in the city centre with a small library.";

    fn rules() -> ScoringRules {
        ScoringRules::default()
    }

    #[test]
    fn test_analyze_backend_scenario() {
        assert!(BACKEND_JD.chars().count() > 800);

        let entry = analyze_jd(BACKEND_JD, "Acme", "Backend Engineer", None, &rules()).unwrap();

        assert_eq!(
            entry.detected_categories,
            vec![
                SkillCategory::Web,
                SkillCategory::Data,
                SkillCategory::CloudDevOps
            ]
        );
        assert_eq!(entry.base_score, 80);
        assert_eq!(entry.final_score, 80);
        assert!(entry.skill_confidence_map.is_empty());
        assert_eq!(entry.questions.len(), 10);
        assert_eq!(entry.checklist.len(), 4);
        assert_eq!(entry.plan_7_days.len(), 7);
        assert_eq!(entry.extracted_skills.web, vec!["react"]);
        assert_eq!(entry.extracted_skills.data, vec!["sql"]);
        assert_eq!(entry.extracted_skills.cloud, vec!["docker"]);
        assert!(entry.extracted_skills.other.is_empty());
        assert_eq!(entry.created_at, entry.updated_at);

        let intel = entry.company_intel.as_ref().unwrap();
        assert_eq!(intel.size, CompanySize::Startup);
        assert_eq!(intel.round_mapping, entry.round_mapping);
        assert_eq!(entry.round_mapping.len(), 3);
    }

    #[test]
    fn test_analyze_enterprise_with_core_cs() {
        let jd = "Strong DSA, operating system and networking fundamentals, Java preferred.";
        let entry = analyze_jd(jd, "Google", "SDE", None, &rules()).unwrap();

        let intel = entry.company_intel.as_ref().unwrap();
        assert_eq!(intel.size, CompanySize::Enterprise);
        let numbers: Vec<u32> = entry.round_mapping.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_analyze_size_override() {
        let entry = analyze_jd(
            "Looking for a React developer",
            "Acme",
            "",
            Some(CompanySize::MidSize),
            &rules(),
        )
        .unwrap();
        assert_eq!(
            entry.company_intel.as_ref().unwrap().size,
            CompanySize::MidSize
        );
    }

    #[test]
    fn test_analyze_rejects_empty_jd() {
        let err = analyze_jd("  \n\t", "Acme", "SDE", None, &rules()).unwrap_err();
        assert_eq!(err, AnalyzeError::EmptyJobDescription);
    }

    #[test]
    fn test_analyze_without_skills_uses_defaults() {
        let entry = analyze_jd("We need a friendly person.", "", "", None, &rules()).unwrap();
        assert!(entry.detected_categories.is_empty());
        assert_eq!(entry.extracted_skills.other, DEFAULT_SKILLS.to_vec());
        assert_eq!(entry.base_score, 35);
    }

    #[test]
    fn test_analyze_is_deterministic_apart_from_identity() {
        let a = analyze_jd(BACKEND_JD, "Acme", "Backend Engineer", None, &rules()).unwrap();
        let b = analyze_jd(BACKEND_JD, "Acme", "Backend Engineer", None, &rules()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.base_score, b.base_score);
        assert_eq!(a.questions, b.questions);
        assert_eq!(a.checklist, b.checklist);
        assert_eq!(a.plan_7_days, b.plan_7_days);
    }

    #[test]
    fn test_apply_skill_confidence_updates_final_score() {
        let mut entry =
            analyze_jd(BACKEND_JD, "Acme", "Backend Engineer", None, &rules()).unwrap();

        let cmp = apply_skill_confidence(&mut entry, "react", Confidence::Know, &rules()).unwrap();
        assert_eq!(cmp.before, 80);
        assert_eq!(cmp.after, 82);
        assert_eq!(cmp.trend, ScoreTrend::Improved);

        apply_skill_confidence(&mut entry, "docker", Confidence::Know, &rules()).unwrap();
        let cmp = apply_skill_confidence(&mut entry, "sql", Confidence::Practice, &rules()).unwrap();
        assert_eq!(cmp.after, 83);
        assert_eq!(entry.final_score, 83);
        assert_eq!(entry.base_score, 80);
        assert_eq!(entry.weak_skills(3), vec!["sql"]);
    }

    #[test]
    fn test_apply_skill_confidence_overwrites_previous_level() {
        let mut entry =
            analyze_jd(BACKEND_JD, "Acme", "Backend Engineer", None, &rules()).unwrap();
        apply_skill_confidence(&mut entry, "react", Confidence::Know, &rules()).unwrap();
        let cmp =
            apply_skill_confidence(&mut entry, "react", Confidence::Practice, &rules()).unwrap();
        assert_eq!(cmp.after, 79);
        assert_eq!(entry.skill_confidence_map.len(), 1);
    }

    #[test]
    fn test_apply_skill_confidence_rejects_unknown_skill() {
        let mut entry =
            analyze_jd(BACKEND_JD, "Acme", "Backend Engineer", None, &rules()).unwrap();
        let err =
            apply_skill_confidence(&mut entry, "cobol", Confidence::Know, &rules()).unwrap_err();
        assert_eq!(
            err,
            ConfidenceError::UnknownSkill {
                skill: "cobol".to_string()
            }
        );
        assert_eq!(entry.final_score, 80);
    }
}
