use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyzer::{analyze_jd, apply_skill_confidence};
use crate::company::{get_company_size_label, CompanySize};
use crate::config::ScoringRules;
use crate::data::{AnalysisEntry, Confidence};
use crate::history::{EntryPatch, HistoryStore};
use crate::report;
use crate::scoring::{
    calculate_base_score, generate_score_breakdown, readiness_label, validate_base_score,
};
use crate::skills::{skill_tags, DetectedSkills};
use crate::storage::KeyValueStore;
use crate::validator::validate_jd_input;

pub fn parse_company_size(value: &str) -> Result<CompanySize> {
    match value.to_lowercase().as_str() {
        "startup" => Ok(CompanySize::Startup),
        "mid-size" | "midsize" | "mid" => Ok(CompanySize::MidSize),
        "enterprise" => Ok(CompanySize::Enterprise),
        other => anyhow::bail!(
            "Unknown company size: {} (expected startup, mid-size or enterprise)",
            other
        ),
    }
}

/// Requested confidence change for one skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceChange {
    Set(Confidence),
    Toggle,
}

pub fn parse_confidence_change(value: &str) -> Result<ConfidenceChange> {
    match value.to_lowercase().as_str() {
        "know" => Ok(ConfidenceChange::Set(Confidence::Know)),
        "practice" => Ok(ConfidenceChange::Set(Confidence::Practice)),
        "toggle" => Ok(ConfidenceChange::Toggle),
        other => anyhow::bail!(
            "Unknown confidence level: {} (expected know, practice or toggle)",
            other
        ),
    }
}

fn require_entry<S: KeyValueStore>(history: &HistoryStore<S>, id: &str) -> Result<AnalysisEntry> {
    history
        .get_by_id(id)?
        .with_context(|| format!("Analysis {} not found", id))
}

/// Analyze a JD and save the result to history.
pub fn analyze<S: KeyValueStore>(
    history: &HistoryStore<S>,
    rules: &ScoringRules,
    jd_file: &Path,
    company: &str,
    role: &str,
    size: Option<&str>,
) -> Result<AnalysisEntry> {
    let jd_text = fs::read_to_string(jd_file)
        .with_context(|| format!("Failed to read job description: {:?}", jd_file))?;

    let check = validate_jd_input(&jd_text, rules);
    if !check.is_valid {
        anyhow::bail!("{}", check.message);
    }
    if check.warning {
        println!("Warning: {}", check.message);
    }

    let size = size.map(parse_company_size).transpose()?;
    let entry = analyze_jd(&jd_text, company, role, size, rules)?;
    let entry = history.create(entry)?;

    println!("Saved analysis {}", entry.id);
    println!(
        "Readiness: {}/100 ({})",
        entry.final_score,
        readiness_label(entry.final_score)
    );

    let categories: Vec<&str> = entry.detected_categories.iter().map(|c| c.label()).collect();
    if categories.is_empty() {
        println!("No skill categories detected");
    } else {
        println!("Detected: {}", categories.join(", "));
    }

    if let Some(intel) = &entry.company_intel {
        println!(
            "Company: {} ({}, {} employees), {}",
            display_or_dash(&entry.company),
            intel.size,
            get_company_size_label(intel.size),
            intel.industry
        );
    }
    println!("Interview rounds: {}", entry.round_mapping.len());

    Ok(entry)
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

pub fn list<S: KeyValueStore>(history: &HistoryStore<S>) -> Result<()> {
    let listing = history.list()?;

    if let Some(error) = &listing.load_error {
        println!("History could not be read: {}", error);
        return Ok(());
    }

    if listing.entries.is_empty() {
        println!("No analyses saved yet.");
    } else {
        println!(
            "{:<38} {:<12} {:<20} {:<24} SCORE",
            "ID", "DATE", "COMPANY", "ROLE"
        );
        println!("{}", "-".repeat(100));

        for entry in &listing.entries {
            println!(
                "{:<38} {:<12} {:<20} {:<24} {}",
                entry.id,
                entry.created_at.get(..10).unwrap_or(entry.created_at.as_str()),
                truncate(display_or_dash(&entry.company), 20),
                truncate(display_or_dash(&entry.role), 24),
                entry.final_score
            );
        }
    }

    if listing.corrupted_count > 0 {
        println!(
            "\n{} saved entr{} couldn't be loaded. Create a new analysis.",
            listing.corrupted_count,
            if listing.corrupted_count == 1 { "y" } else { "ies" }
        );
    }

    Ok(())
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let cut: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

pub fn show<S: KeyValueStore>(
    history: &HistoryStore<S>,
    rules: &ScoringRules,
    id: &str,
    format: &str,
) -> Result<()> {
    let entry = require_entry(history, id)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&entry)?),
        "md" => println!("{}", render_markdown(&entry, rules)),
        "text" => println!("{}", report::render_text(&entry)),
        other => anyhow::bail!("Unknown format: {}. Use json, md or text", other),
    }

    Ok(())
}

/// Markdown summary with the score breakdown and company context.
pub fn render_markdown(entry: &AnalysisEntry, rules: &ScoringRules) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "# {} - {}\n\n",
        display_or_dash(&entry.company),
        display_or_dash(&entry.role)
    ));
    out.push_str(&format!(
        "**Readiness:** {}/100 ({})\n\n",
        entry.final_score,
        readiness_label(entry.final_score)
    ));

    let breakdown = generate_score_breakdown(
        &entry.jd_text,
        &entry.company,
        &entry.role,
        &entry.detected_categories,
        &entry.skill_confidence_map,
        rules,
    );
    out.push_str("## Score Breakdown\n\n");
    for item in &breakdown.breakdown {
        out.push_str(&format!("- {}: {:+}\n", item.reason, item.points));
    }
    out.push_str(&format!("- **Total:** {}\n\n", breakdown.total));

    if let Some(intel) = &entry.company_intel {
        out.push_str("## Company\n\n");
        out.push_str(&format!(
            "- **Size:** {} ({} employees)\n",
            intel.size,
            get_company_size_label(intel.size)
        ));
        out.push_str(&format!("- **Industry:** {}\n", intel.industry));
        out.push_str(&format!("- **Hiring focus:** {}\n\n", intel.hiring_focus.title));
    }

    let detected: DetectedSkills = entry
        .detected_categories
        .iter()
        .map(|c| (*c, entry.extracted_skills.bucket(*c).to_vec()))
        .collect();
    let tags = skill_tags(&detected);
    if !tags.is_empty() {
        out.push_str("## Skills\n\n");
        for category in &entry.detected_categories {
            let labels: Vec<&str> = tags
                .iter()
                .filter(|tag| tag.category == *category)
                .map(|tag| tag.label.as_str())
                .collect();
            out.push_str(&format!("- **{}:** {}\n", category.full_name(), labels.join(", ")));
        }
        out.push('\n');
    }

    if !entry.round_mapping.is_empty() {
        out.push_str("## Interview Rounds\n\n");
        for round in &entry.round_mapping {
            out.push_str(&format!(
                "{}. **{}** ({})\n   {}\n",
                round.number, round.title, round.duration, round.why
            ));
        }
        out.push('\n');
    }

    let weak = entry.weak_skills(3);
    if !weak.is_empty() {
        out.push_str(&format!("**Focus next on:** {}\n", weak.join(", ")));
    }

    out
}

/// Set or toggle confidence for one skill and persist the new final score.
pub fn confidence<S: KeyValueStore>(
    history: &HistoryStore<S>,
    rules: &ScoringRules,
    id: &str,
    skill: &str,
    change: &str,
) -> Result<()> {
    let mut entry = require_entry(history, id)?;

    let level = match parse_confidence_change(change)? {
        ConfidenceChange::Set(level) => level,
        ConfidenceChange::Toggle => entry
            .skill_confidence_map
            .get(skill)
            .copied()
            .unwrap_or(Confidence::Practice)
            .toggled(),
    };

    let comparison = apply_skill_confidence(&mut entry, skill, level, rules)?;

    let patch = EntryPatch {
        final_score: Some(entry.final_score),
        skill_confidence_map: Some(entry.skill_confidence_map.clone()),
        ..EntryPatch::default()
    };
    history
        .update(id, patch)?
        .with_context(|| format!("Analysis {} disappeared during update", id))?;

    println!("{}: {}", skill, level);
    println!(
        "Score {} -> {} ({}, {:+.2}%)",
        comparison.before, comparison.after, comparison.message, comparison.percent_change
    );

    Ok(())
}

/// Write the plain-text report. Returns the path written.
pub fn export<S: KeyValueStore>(
    history: &HistoryStore<S>,
    id: &str,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let entry = require_entry(history, id)?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(report::default_file_name(&entry)),
    };

    fs::write(&path, report::render_text(&entry))
        .with_context(|| format!("Failed to write report: {:?}", path))?;

    println!("Report written to {}", path.display());
    Ok(path)
}

pub fn delete<S: KeyValueStore>(history: &HistoryStore<S>, id: &str) -> Result<()> {
    if history.delete(id)? {
        println!("Deleted analysis {}", id);
    } else {
        println!("No analysis with id {}", id);
    }
    Ok(())
}

pub fn clear<S: KeyValueStore>(history: &HistoryStore<S>) -> Result<()> {
    if history.clear()? {
        println!("History cleared");
    } else {
        println!("History was already empty");
    }
    Ok(())
}

/// Entry whose stored base score no longer matches a recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMismatch {
    pub id: String,
    pub stored: i32,
    pub recalculated: i32,
}

pub fn find_score_mismatches(entries: &[AnalysisEntry], rules: &ScoringRules) -> Vec<ScoreMismatch> {
    entries
        .iter()
        .filter_map(|entry| {
            let recalculated = calculate_base_score(
                &entry.jd_text,
                &entry.company,
                &entry.role,
                &entry.detected_categories,
                rules,
            );
            if validate_base_score(entry.base_score, recalculated, rules) {
                None
            } else {
                Some(ScoreMismatch {
                    id: entry.id.clone(),
                    stored: entry.base_score,
                    recalculated,
                })
            }
        })
        .collect()
}

/// Report stored base scores that diverge from a recomputation. Nothing is
/// rewritten.
pub fn verify<S: KeyValueStore>(history: &HistoryStore<S>, rules: &ScoringRules) -> Result<()> {
    let listing = history.list()?;
    let mismatches = find_score_mismatches(&listing.entries, rules);

    for m in &mismatches {
        tracing::warn!(
            id = %m.id,
            stored = m.stored,
            recalculated = m.recalculated,
            "Base score mismatch"
        );
        println!(
            "MISMATCH {}: stored {}, recalculated {}",
            m.id, m.stored, m.recalculated
        );
    }

    println!(
        "Checked {} entries: {} mismatched, {} unreadable",
        listing.entries.len(),
        mismatches.len(),
        listing.corrupted_count
    );

    Ok(())
}
