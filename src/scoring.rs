use serde::{Deserialize, Serialize};

use crate::config::ScoringRules;
use crate::data::{now_timestamp, Confidence, SkillConfidenceMap};
use crate::skills::SkillCategory;

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

fn clamp_score(score: i32) -> i32 {
    score.clamp(MIN_SCORE, MAX_SCORE)
}

fn category_points(category_count: usize, rules: &ScoringRules) -> i32 {
    let count = i32::try_from(category_count).unwrap_or(i32::MAX);
    count
        .saturating_mul(rules.points_per_category)
        .min(rules.category_points_cap)
}

fn is_detailed(jd_text: &str, rules: &ScoringRules) -> bool {
    jd_text.chars().count() > rules.detailed_jd_threshold
}

/// Readiness score derived only from the shape of the input. Deterministic:
/// identical arguments always produce the same score.
pub fn calculate_base_score(
    jd_text: &str,
    company: &str,
    role: &str,
    detected_categories: &[SkillCategory],
    rules: &ScoringRules,
) -> i32 {
    let mut score = rules
        .starting_score
        .saturating_add(category_points(detected_categories.len(), rules));

    if !company.trim().is_empty() {
        score = score.saturating_add(rules.company_points);
    }
    if !role.trim().is_empty() {
        score = score.saturating_add(rules.role_points);
    }
    if is_detailed(jd_text, rules) {
        score = score.saturating_add(rules.detailed_jd_points);
    }

    clamp_score(score)
}

/// (know, practice) counts in a confidence map.
fn confidence_counts(confidence_map: &SkillConfidenceMap) -> (i32, i32) {
    confidence_map
        .values()
        .fold((0, 0), |(know, practice), confidence| match confidence {
            Confidence::Know => (know.saturating_add(1), practice),
            Confidence::Practice => (know, practice.saturating_add(1)),
        })
}

/// Base score adjusted by the current confidence map, clamped to 0-100.
/// An empty map leaves the base score unchanged.
pub fn calculate_final_score(
    base_score: i32,
    confidence_map: &SkillConfidenceMap,
    rules: &ScoringRules,
) -> i32 {
    if confidence_map.is_empty() {
        return base_score;
    }

    let (know, practice) = confidence_counts(confidence_map);
    let adjustment = know_points(know, rules).saturating_add(practice_points(practice, rules));
    clamp_score(base_score.saturating_add(adjustment))
}

fn know_points(know: i32, rules: &ScoringRules) -> i32 {
    know.saturating_mul(rules.know_points)
}

/// Non-positive for a non-negative penalty.
fn practice_points(practice: i32, rules: &ScoringRules) -> i32 {
    0i32.saturating_sub(practice.saturating_mul(rules.practice_penalty))
}

/// True when a stored base score is within tolerance of a recomputation.
pub fn validate_base_score(stored: i32, recalculated: i32, rules: &ScoringRules) -> bool {
    (i64::from(stored) - i64::from(recalculated)).abs() <= i64::from(rules.tamper_tolerance)
}

/// Score snapshot taken at analysis time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreObject {
    pub base_score: i32,
    pub final_score: i32,
    pub initial_score: i32,
    pub last_updated: String,
}

pub fn create_score_object(
    jd_text: &str,
    company: &str,
    role: &str,
    detected_categories: &[SkillCategory],
    rules: &ScoringRules,
) -> ScoreObject {
    let base_score = calculate_base_score(jd_text, company, role, detected_categories, rules);
    ScoreObject {
        base_score,
        final_score: base_score,
        initial_score: base_score,
        last_updated: now_timestamp(),
    }
}

/// Recompute the final score. `base_score` and `initial_score` are untouched.
pub fn update_final_score(
    score: &ScoreObject,
    confidence_map: &SkillConfidenceMap,
    rules: &ScoringRules,
) -> ScoreObject {
    ScoreObject {
        final_score: calculate_final_score(score.base_score, confidence_map, rules),
        last_updated: now_timestamp(),
        ..score.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownItem {
    pub reason: String,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub breakdown: Vec<BreakdownItem>,
    /// Equals `calculate_base_score` for the same inputs
    pub base_score: i32,
    /// Equals `calculate_final_score(base_score, map)`
    pub total: i32,
}

/// Explain a score term by term, using the same terms as the calculators.
pub fn generate_score_breakdown(
    jd_text: &str,
    company: &str,
    role: &str,
    detected_categories: &[SkillCategory],
    confidence_map: &SkillConfidenceMap,
    rules: &ScoringRules,
) -> ScoreBreakdown {
    let mut breakdown = vec![BreakdownItem {
        reason: "Base score".to_string(),
        points: rules.starting_score,
    }];

    if !detected_categories.is_empty() {
        breakdown.push(BreakdownItem {
            reason: format!("Detected {} skill categories", detected_categories.len()),
            points: category_points(detected_categories.len(), rules),
        });
    }
    if !company.trim().is_empty() {
        breakdown.push(BreakdownItem {
            reason: "Company name provided".to_string(),
            points: rules.company_points,
        });
    }
    if !role.trim().is_empty() {
        breakdown.push(BreakdownItem {
            reason: "Role specified".to_string(),
            points: rules.role_points,
        });
    }
    if is_detailed(jd_text, rules) {
        breakdown.push(BreakdownItem {
            reason: format!("Detailed JD ({}+ chars)", rules.detailed_jd_threshold),
            points: rules.detailed_jd_points,
        });
    }

    let base_score = clamp_score(
        breakdown
            .iter()
            .fold(0i32, |total, item| total.saturating_add(item.points)),
    );

    let (know, practice) = confidence_counts(confidence_map);
    if know > 0 {
        breakdown.push(BreakdownItem {
            reason: format!("{} skills marked as known", know),
            points: know_points(know, rules),
        });
    }
    if practice > 0 {
        breakdown.push(BreakdownItem {
            reason: format!("{} skills need practice", practice),
            points: practice_points(practice, rules),
        });
    }

    ScoreBreakdown {
        breakdown,
        base_score,
        total: calculate_final_score(base_score, confidence_map, rules),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTrend {
    Improved,
    Decreased,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComparison {
    pub before: i32,
    pub after: i32,
    pub improvement: i32,
    /// Rounded to two decimals; 0 when `before` is 0
    pub percent_change: f64,
    pub trend: ScoreTrend,
    pub message: String,
}

pub fn compare_scores(before: i32, after: i32) -> ScoreComparison {
    let improvement = after - before;
    let percent_change = if before > 0 {
        (f64::from(improvement) / f64::from(before) * 10_000.0).round() / 100.0
    } else {
        0.0
    };

    let (trend, message) = match improvement {
        i if i > 0 => (ScoreTrend::Improved, format!("Improved by {} points", i)),
        i if i < 0 => (
            ScoreTrend::Decreased,
            format!("Decreased by {} points", i.abs()),
        ),
        _ => (ScoreTrend::Unchanged, "Score unchanged".to_string()),
    };

    ScoreComparison {
        before,
        after,
        improvement,
        percent_change,
        trend,
        message,
    }
}

/// Short verdict shown under a readiness score.
pub fn readiness_label(score: i32) -> &'static str {
    match score {
        s if s >= 80 => "Excellent! Ready to apply",
        s if s >= 60 => "Good. Continue preparation",
        s if s >= 40 => "Fair. More practice needed",
        _ => "Get started with basics",
    }
}
