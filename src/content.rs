use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::skills::SkillCategory;

pub const QUESTION_TARGET: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    pub completed: bool,
}

/// Round label to its preparation items.
pub type Checklist = BTreeMap<String, Vec<ChecklistItem>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub focus: Vec<SkillCategory>,
    pub tasks: Vec<String>,
}

/// Day label to its plan block.
pub type Plan = BTreeMap<String, DayPlan>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    /// A category label, or "General" for the backfill pool
    pub category: String,
    pub difficulty: Difficulty,
}

struct ChecklistTemplate {
    round: &'static str,
    default: &'static [&'static str],
    overrides: &'static [(SkillCategory, &'static [&'static str])],
}

const CHECKLIST_TEMPLATES: &[ChecklistTemplate] = &[
    ChecklistTemplate {
        round: "Round 1: Aptitude & Basics",
        default: &[
            "Solve basic aptitude problems (10-15 mins)",
            "Review quantitative reasoning concepts",
            "Practice logical reasoning puzzles",
            "Understand problem-solving approach",
            "Learn time management for tests",
            "Review basic mathematics fundamentals",
            "Practice speed and accuracy drills",
        ],
        overrides: &[],
    },
    ChecklistTemplate {
        round: "Round 2: DSA & Core CS",
        default: &[
            "Revise arrays, strings and hash maps",
            "Practice recursion and two-pointer patterns",
            "Understand time and space complexity",
            "Solve easy-to-medium DSA problems (10-15)",
            "Review OOP principles with examples",
            "Revise core CS basics: OS, DBMS, networks",
        ],
        overrides: &[(
            SkillCategory::CoreCs,
            &[
                "Review data structure basics (Arrays, Linked Lists)",
                "Practice sorting and searching algorithms",
                "Cover searching algorithms (Binary Search, Linear Search)",
                "Understand time and space complexity",
                "Solve medium-level DSA problems (15-20)",
                "Review DBMS normalization and queries",
                "Study OS concepts: processes, threads, scheduling",
            ],
        )],
    },
    ChecklistTemplate {
        round: "Round 3: Tech Interview",
        default: &[
            "Prepare project walkthroughs (2-3 projects)",
            "Code a complete solution in 45 mins",
            "Explain architecture and design decisions",
            "Discuss challenges faced and solutions",
            "Be ready for follow-up technical questions",
            "Practice system design basics",
            "Review resume projects thoroughly",
        ],
        overrides: &[
            (
                SkillCategory::Web,
                &[
                    "Prepare project walkthroughs with frontend/backend",
                    "Code complete solutions end-to-end",
                    "Explain API design and database structure",
                    "Discuss state management approach",
                    "Be ready for performance and scalability questions",
                    "Practice responsive design explanations",
                    "Review production deployment experience",
                ],
            ),
            (
                SkillCategory::CloudDevOps,
                &[
                    "Prepare deployment architecture walkthrough",
                    "Explain infrastructure as code",
                    "Discuss scaling and monitoring setup",
                    "Practice explaining CI/CD pipeline",
                    "Be ready for disaster recovery questions",
                    "Review cloud cost optimization",
                    "Discuss containerization strategy",
                ],
            ),
        ],
    },
    ChecklistTemplate {
        round: "Round 4: HR & Managerial",
        default: &[
            "Prepare \"Tell me about yourself\" (2 mins)",
            "Have 3-5 clear project stories ready",
            "Research company culture and values",
            "Prepare questions to ask interviewer",
            "Practice STAR method for behavioral questions",
            "Discuss salary expectations",
            "Prepare for \"Why this role?\" question",
        ],
        overrides: &[],
    },
];

/// (day label, declared focus, tasks)
const DAILY_PLAN: &[(&str, &[SkillCategory], &[&str])] = &[
    (
        "Day 1: Core Fundamentals",
        &[SkillCategory::CoreCs, SkillCategory::Languages],
        &[
            "Review data structure basics (1 hrs)",
            "Learn complexity analysis - O(n), O(log n), O(n²) (45 mins)",
            "Solve 5 easy-level problems on arrays/strings (1.5 hrs)",
        ],
    ),
    (
        "Day 2: Language & OOP Refresh",
        &[SkillCategory::CoreCs, SkillCategory::Languages],
        &[
            "Review OOP concepts and design patterns (45 mins)",
            "Revise language features used in the JD stack (1 hr)",
            "Self-review and notes (15 mins)",
        ],
    ),
    (
        "Day 3: Algorithms Deep Dive",
        &[SkillCategory::CoreCs],
        &[
            "Deep dive into sorting algorithms (1 hr)",
            "Practice searching algorithms (45 mins)",
            "Analyze time/space for each solution (30 mins)",
        ],
    ),
    (
        "Day 4: DSA & Coding Practice",
        &[SkillCategory::CoreCs],
        &[
            "Solve 8-10 medium-level problems (2 hrs)",
            "Practice on one advanced problem (45 mins)",
            "Discuss solutions with peers (30 mins)",
        ],
    ),
    (
        "Day 5: Projects & Alignment",
        &[SkillCategory::Web, SkillCategory::CloudDevOps],
        &[
            "Select and document 2-3 key projects (1 hr)",
            "Create 1-page project summary for each (1.5 hrs)",
            "Practice project walkthrough presentation (1 hr)",
            "Align resume skills with job description (45 mins)",
            "Prepare answers for technical follow-ups (45 mins)",
        ],
    ),
    (
        "Day 6: Mock Interviews",
        &[],
        &[
            "Take a full mock interview (2 hrs)",
            "Review mock interview feedback (30 mins)",
            "Practice answers to common questions (1 hr)",
            "Record yourself and review (45 mins)",
            "Discuss difficult questions with mentor (30 mins)",
            "Polish answers and practice again (30 mins)",
        ],
    ),
    (
        "Day 7: Revision & Weak Areas",
        &[],
        &[
            "Identify weak areas from practice (30 mins)",
            "Focused revision on weak topics (2 hrs)",
            "Quick review of all key concepts (1 hr)",
            "Solve quick problems for speed (45 mins)",
            "Mentally prepare for interview (30 mins)",
            "Review company and role details (30 mins)",
        ],
    ),
];

fn question_bank(category: SkillCategory) -> &'static [&'static str] {
    match category {
        SkillCategory::CoreCs => &[
            "Explain the difference between Stack and Queue with real-world use cases.",
            "How would you optimize a linear search algorithm? When is binary search not applicable?",
            "What is the difference between process and thread? When would you use each?",
            "Explain database normalization and its importance. What is 3NF?",
            "How does TCP/IP protocol work? Explain the three-way handshake.",
        ],
        SkillCategory::Languages => &[
            "Explain the concept of polymorphism. Provide examples in your preferred language.",
            "What is the difference between pass by value and pass by reference?",
            "Explain memory management in your language. How does garbage collection work?",
            "What are the differences between compiled and interpreted languages?",
            "Explain exception handling and error management best practices.",
        ],
        SkillCategory::Web => &[
            "Explain React state vs props. How do you manage state in complex applications?",
            "What is the virtual DOM? How does React reconciliation work?",
            "Explain the difference between REST and GraphQL APIs. When would you use each?",
            "How would you optimize a slow-loading React component?",
            "Explain server-side rendering vs client-side rendering. What are the trade-offs?",
        ],
        SkillCategory::Data => &[
            "When would you use SQL vs NoSQL? Provide pros and cons of each.",
            "Explain database indexing. How does it improve query performance?",
            "What is the N+1 query problem and how would you solve it?",
            "Explain ACID properties in databases. Why are they important?",
            "How would you design a database schema for a social media application?",
        ],
        SkillCategory::CloudDevOps => &[
            "Explain the differences between EC2, RDS, and S3 on AWS.",
            "How would you design a highly available and scalable system?",
            "Explain containerization vs virtualization. When would you use each?",
            "What is Infrastructure as Code? How does it benefit DevOps?",
            "Explain blue-green deployment and canary deployment strategies.",
        ],
        SkillCategory::Testing => &[
            "What is the difference between unit, integration, and E2E testing?",
            "How would you write automated tests for a React component?",
            "Explain test-driven development (TDD). What are its benefits?",
            "How would you test API endpoints? What should you validate?",
            "Explain code coverage. What percentage should you aim for?",
        ],
    }
}

const GENERAL_QUESTIONS: &[&str] = &[
    "Tell me about a challenging project you worked on and how you solved it.",
    "Describe your experience with version control and working in teams.",
    "How do you approach learning new technologies?",
    "What is your biggest strength as a developer?",
    "How do you handle debugging a complex issue?",
];

pub const GENERAL_CATEGORY: &str = "General";

/// Build the four-round checklist. Only the first detected category can
/// select a round override; later categories are ignored.
pub fn generate_preparation_checklist(detected_categories: &[SkillCategory]) -> Checklist {
    let first = detected_categories.first().copied();

    CHECKLIST_TEMPLATES
        .iter()
        .map(|template| {
            let items = first
                .and_then(|category| {
                    template
                        .overrides
                        .iter()
                        .find(|(c, _)| *c == category)
                        .map(|(_, items)| *items)
                })
                .unwrap_or(template.default);

            let items = items
                .iter()
                .map(|text| ChecklistItem {
                    text: text.to_string(),
                    completed: false,
                })
                .collect();

            (template.round.to_string(), items)
        })
        .collect()
}

/// One block per day. `focus` keeps only the declared areas that were actually
/// detected; tasks are fixed per day.
pub fn generate_7_day_plan(detected_categories: &[SkillCategory]) -> Plan {
    DAILY_PLAN
        .iter()
        .map(|(day, focus, tasks)| {
            let plan = DayPlan {
                focus: focus
                    .iter()
                    .copied()
                    .filter(|c| detected_categories.contains(c))
                    .collect(),
                tasks: tasks.iter().map(|t| t.to_string()).collect(),
            };
            (day.to_string(), plan)
        })
        .collect()
}

/// Category questions in detection order, then general backfill, capped at ten.
pub fn generate_interview_questions(detected_categories: &[SkillCategory]) -> Vec<Question> {
    let mut questions = Vec::new();
    let mut used: HashSet<&str> = HashSet::new();

    for category in detected_categories {
        for q in question_bank(*category) {
            if used.insert(*q) {
                questions.push(Question {
                    question: q.to_string(),
                    category: category.label().to_string(),
                    difficulty: Difficulty::Medium,
                });
            }
        }
    }

    for q in GENERAL_QUESTIONS {
        if questions.len() >= QUESTION_TARGET {
            break;
        }
        if used.insert(*q) {
            questions.push(Question {
                question: q.to_string(),
                category: GENERAL_CATEGORY.to_string(),
                difficulty: Difficulty::Easy,
            });
        }
    }

    questions.truncate(QUESTION_TARGET);
    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checklist_has_four_rounds() {
        let checklist = generate_preparation_checklist(&[]);
        assert_eq!(checklist.len(), 4);
        assert!(checklist.values().all(|items| !items.is_empty()));
        assert!(checklist
            .values()
            .flatten()
            .all(|item| !item.completed));
    }

    #[test]
    fn test_checklist_override_uses_first_category_only() {
        // Web is first, so the Cloud/DevOps override for round 3 is not used
        let checklist =
            generate_preparation_checklist(&[SkillCategory::Web, SkillCategory::CloudDevOps]);
        let tech = &checklist["Round 3: Tech Interview"];
        assert_eq!(tech[0].text, "Prepare project walkthroughs with frontend/backend");

        let dsa = &checklist["Round 2: DSA & Core CS"];
        assert_eq!(dsa[0].text, "Revise arrays, strings and hash maps");
    }

    #[test]
    fn test_checklist_core_cs_override() {
        let checklist = generate_preparation_checklist(&[SkillCategory::CoreCs, SkillCategory::Web]);
        let dsa = &checklist["Round 2: DSA & Core CS"];
        assert_eq!(dsa[0].text, "Review data structure basics (Arrays, Linked Lists)");
        // Web is second and does not override round 3
        let tech = &checklist["Round 3: Tech Interview"];
        assert_eq!(tech[0].text, "Prepare project walkthroughs (2-3 projects)");
    }

    #[test]
    fn test_checklist_keys_are_ordered() {
        let checklist = generate_preparation_checklist(&[]);
        let rounds: Vec<_> = checklist.keys().map(String::as_str).collect();
        assert_eq!(
            rounds,
            vec![
                "Round 1: Aptitude & Basics",
                "Round 2: DSA & Core CS",
                "Round 3: Tech Interview",
                "Round 4: HR & Managerial",
            ]
        );
    }

    #[test]
    fn test_plan_has_seven_days_in_order() {
        let plan = generate_7_day_plan(&[]);
        assert_eq!(plan.len(), 7);
        let days: Vec<_> = plan.keys().map(String::as_str).collect();
        assert!(days[0].starts_with("Day 1:"));
        assert!(days[6].starts_with("Day 7:"));
        assert!(plan.values().all(|day| day.focus.is_empty() && !day.tasks.is_empty()));
    }

    #[test]
    fn test_plan_focus_intersects_detected() {
        let plan = generate_7_day_plan(&[SkillCategory::Languages, SkillCategory::CloudDevOps]);
        assert_eq!(
            plan["Day 1: Core Fundamentals"].focus,
            vec![SkillCategory::Languages]
        );
        assert!(plan["Day 3: Algorithms Deep Dive"].focus.is_empty());
        assert_eq!(
            plan["Day 5: Projects & Alignment"].focus,
            vec![SkillCategory::CloudDevOps]
        );
        assert_eq!(plan["Day 6: Mock Interviews"].tasks.len(), 6);
    }

    #[test]
    fn test_questions_backfilled_to_ten() {
        let questions = generate_interview_questions(&[SkillCategory::Web]);
        assert_eq!(questions.len(), QUESTION_TARGET);
        assert!(questions[..5].iter().all(|q| q.category == "Web"));
        assert!(questions[5..]
            .iter()
            .all(|q| q.category == GENERAL_CATEGORY && q.difficulty == Difficulty::Easy));
    }

    #[test]
    fn test_questions_without_categories_use_general_pool_only() {
        let questions = generate_interview_questions(&[]);
        assert_eq!(questions.len(), GENERAL_QUESTIONS.len());
    }

    #[test]
    fn test_questions_capped_at_ten_in_detection_order() {
        let questions = generate_interview_questions(&[
            SkillCategory::Data,
            SkillCategory::CoreCs,
            SkillCategory::Testing,
        ]);
        assert_eq!(questions.len(), QUESTION_TARGET);
        assert_eq!(questions[0].category, "Data");
        assert_eq!(questions[5].category, "Core CS");
        assert!(questions.iter().all(|q| q.category != "Testing"));
    }

    #[test]
    fn test_questions_are_unique() {
        let questions = generate_interview_questions(&[SkillCategory::Web, SkillCategory::Web]);
        let unique: HashSet<_> = questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(unique.len(), questions.len());
    }
}
