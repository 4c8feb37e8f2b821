use chrono::DateTime;

use crate::data::{AnalysisEntry, Confidence};

const WEAK_SKILL_LIMIT: usize = 3;

pub fn plan_text(entry: &AnalysisEntry) -> String {
    entry
        .plan_7_days
        .iter()
        .map(|(day, plan)| {
            let tasks: Vec<String> = plan
                .tasks
                .iter()
                .enumerate()
                .map(|(i, task)| format!("{}. {}", i + 1, task))
                .collect();
            format!("{}\n{}", day, tasks.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn checklist_text(entry: &AnalysisEntry) -> String {
    entry
        .checklist
        .iter()
        .map(|(round, items)| {
            let items: Vec<String> = items.iter().map(|item| format!("☐ {}", item.text)).collect();
            format!("{}\n{}", round, items.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn questions_text(entry: &AnalysisEntry) -> String {
    entry
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {}\nCategory: {}", i + 1, q.question, q.category))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Every extracted skill with its confidence; unrated skills show as practice.
fn confidence_text(entry: &AnalysisEntry) -> String {
    entry
        .extracted_skills
        .all_skills()
        .map(|skill| {
            let confidence = entry
                .skill_confidence_map
                .get(skill)
                .copied()
                .unwrap_or(Confidence::Practice);
            format!("{}: {}", skill, confidence)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn display_date(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

/// Plain-text report of one analysis.
pub fn render_text(entry: &AnalysisEntry) -> String {
    let weak = entry.weak_skills(WEAK_SKILL_LIMIT);
    let weak = if weak.is_empty() {
        "None".to_string()
    } else {
        weak.join(", ")
    };

    format!(
        "JOB ANALYSIS REPORT\n\
         Company: {company}\n\
         Role: {role}\n\
         Date: {date}\n\
         \n\
         READINESS SCORE: {score}/100\n\
         \n\
         7-DAY PREPARATION PLAN\n\
         {plan}\n\
         \n\
         INTERVIEW PREPARATION CHECKLIST\n\
         {checklist}\n\
         \n\
         {count} INTERVIEW QUESTIONS\n\
         {questions}\n\
         \n\
         SKILL CONFIDENCE MAP\n\
         {confidence}\n\
         \n\
         WEAK SKILLS TO FOCUS ON\n\
         {weak}\n",
        company = entry.company,
        role = entry.role,
        date = display_date(&entry.created_at),
        score = entry.final_score,
        plan = plan_text(entry),
        checklist = checklist_text(entry),
        count = entry.questions.len(),
        questions = questions_text(entry),
        confidence = confidence_text(entry),
        weak = weak,
    )
}

/// `<company>-<role>-analysis.txt` with path separators replaced.
pub fn default_file_name(entry: &AnalysisEntry) -> String {
    let name = format!("{}-{}-analysis.txt", entry.company.trim(), entry.role.trim());
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_jd;
    use crate::config::ScoringRules;

    fn make_entry() -> AnalysisEntry {
        let mut entry = analyze_jd(
            "Backend role using react, sql and docker in production",
            "Acme",
            "Backend Engineer",
            None,
            &ScoringRules::default(),
        )
        .unwrap();
        entry.created_at = "2024-05-01T10:00:00.000Z".to_string();
        entry
    }

    #[test]
    fn test_render_text_sections() {
        let text = render_text(&make_entry());

        assert!(text.starts_with("JOB ANALYSIS REPORT\nCompany: Acme\nRole: Backend Engineer\n"));
        assert!(text.contains("Date: 2024-05-01"));
        assert!(text.contains("READINESS SCORE: 70/100"));
        assert!(text.contains("7-DAY PREPARATION PLAN\nDay 1: Core Fundamentals\n1. "));
        assert!(text.contains("INTERVIEW PREPARATION CHECKLIST\nRound 1: Aptitude & Basics\n☐ "));
        assert!(text.contains("10 INTERVIEW QUESTIONS\n1. "));
        assert!(text.contains("Category: Web"));
        assert!(text.contains("SKILL CONFIDENCE MAP\n"));
        assert!(text.contains("WEAK SKILLS TO FOCUS ON\nNone\n"));
    }

    #[test]
    fn test_render_text_confidence_and_weak_skills() {
        let mut entry = make_entry();
        entry
            .skill_confidence_map
            .insert("react".to_string(), Confidence::Know);
        entry
            .skill_confidence_map
            .insert("sql".to_string(), Confidence::Practice);

        let text = render_text(&entry);
        assert!(text.contains("react: know"));
        assert!(text.contains("sql: practice"));
        assert!(text.contains("docker: practice"));
        assert!(text.contains("WEAK SKILLS TO FOCUS ON\nsql\n"));
    }

    #[test]
    fn test_checklist_text_format() {
        let text = checklist_text(&make_entry());
        let blocks: Vec<_> = text.split("\n\n").collect();
        assert_eq!(blocks.len(), 4);
        assert!(blocks.iter().all(|b| b.lines().skip(1).all(|l| l.starts_with("☐ "))));
    }

    #[test]
    fn test_questions_text_numbering() {
        let text = questions_text(&make_entry());
        assert!(text.starts_with("1. "));
        assert!(text.contains("\n\n10. "));
    }

    #[test]
    fn test_default_file_name() {
        let mut entry = make_entry();
        assert_eq!(default_file_name(&entry), "Acme-Backend Engineer-analysis.txt");

        entry.role = "Dev/Ops".to_string();
        assert_eq!(default_file_name(&entry), "Acme-Dev-Ops-analysis.txt");
    }

    #[test]
    fn test_display_date_fallback() {
        assert_eq!(display_date("not a date"), "not a date");
    }
}
