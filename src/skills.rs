use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed skill domains, declared in keyword-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    #[serde(rename = "Core CS")]
    CoreCs,
    #[serde(rename = "Languages")]
    Languages,
    #[serde(rename = "Web")]
    Web,
    #[serde(rename = "Data")]
    Data,
    #[serde(rename = "Cloud/DevOps")]
    CloudDevOps,
    #[serde(rename = "Testing")]
    Testing,
}

/// Matched keywords per detected category. Only categories with at least one
/// match are present; keywords keep keyword-table order.
pub type DetectedSkills = BTreeMap<SkillCategory, Vec<String>>;

impl SkillCategory {
    pub const ALL: [SkillCategory; 6] = [
        SkillCategory::CoreCs,
        SkillCategory::Languages,
        SkillCategory::Web,
        SkillCategory::Data,
        SkillCategory::CloudDevOps,
        SkillCategory::Testing,
    ];

    /// Display label, also used as the key in legacy stored entries.
    pub fn label(self) -> &'static str {
        match self {
            SkillCategory::CoreCs => "Core CS",
            SkillCategory::Languages => "Languages",
            SkillCategory::Web => "Web",
            SkillCategory::Data => "Data",
            SkillCategory::CloudDevOps => "Cloud/DevOps",
            SkillCategory::Testing => "Testing",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            SkillCategory::CoreCs => "Core CS Fundamentals",
            SkillCategory::Languages => "Programming Languages",
            SkillCategory::Web => "Web Development",
            SkillCategory::Data => "Databases & Data",
            SkillCategory::CloudDevOps => "Cloud & DevOps",
            SkillCategory::Testing => "Testing & QA",
        }
    }

    /// Internal bucket name in the canonical `extractedSkills` object.
    pub fn key(self) -> &'static str {
        match self {
            SkillCategory::CoreCs => "coreCS",
            SkillCategory::Languages => "languages",
            SkillCategory::Web => "web",
            SkillCategory::Data => "data",
            SkillCategory::CloudDevOps => "cloud",
            SkillCategory::Testing => "testing",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            SkillCategory::CoreCs => &[
                "dsa",
                "data structure",
                "algorithm",
                "oop",
                "object oriented",
                "dbms",
                "database management",
                "os",
                "operating system",
                "networks",
                "networking",
                "tcp",
                "udp",
            ],
            SkillCategory::Languages => &[
                "java",
                "python",
                "javascript",
                "typescript",
                "c++",
                "c#",
                "csharp",
                "go",
                "golang",
                "c language",
                "rust",
            ],
            SkillCategory::Web => &[
                "react", "next.js", "node.js", "nodejs", "express", "rest", "graphql", "html",
                "css", "vue", "angular", "svelte",
            ],
            SkillCategory::Data => &[
                "sql",
                "mongodb",
                "postgresql",
                "mysql",
                "redis",
                "elasticsearch",
                "cassandra",
                "dynamo",
                "firestore",
                "database",
            ],
            SkillCategory::CloudDevOps => &[
                "aws",
                "azure",
                "gcp",
                "docker",
                "kubernetes",
                "k8s",
                "ci/cd",
                "jenkins",
                "gitlab",
                "linux",
                "devops",
                "terraform",
                "ansible",
            ],
            SkillCategory::Testing => &[
                "selenium",
                "cypress",
                "playwright",
                "junit",
                "pytest",
                "testing",
                "automation",
                "qa",
                "test",
                "mocha",
                "jasmine",
            ],
        }
    }
}

impl std::fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillExtraction {
    pub detected_skills: DetectedSkills,
    pub detected_categories: Vec<SkillCategory>,
    pub total_categories: usize,
}

/// Detect skill keywords by case-insensitive substring containment.
///
/// Matching is not word-boundary aware, so short keywords such as `go` or
/// `os` also match inside longer words.
pub fn extract_skills(jd_text: &str) -> SkillExtraction {
    let text = jd_text.to_lowercase();
    let mut detected_skills = DetectedSkills::new();

    for category in SkillCategory::ALL {
        let found: Vec<String> = category
            .keywords()
            .iter()
            .filter(|keyword| text.contains(*keyword))
            .map(|keyword| keyword.to_string())
            .collect();

        if !found.is_empty() {
            detected_skills.insert(category, found);
        }
    }

    let detected_categories: Vec<SkillCategory> = detected_skills.keys().copied().collect();
    let total_categories = detected_categories.len();

    SkillExtraction {
        detected_skills,
        detected_categories,
        total_categories,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTag {
    pub label: String,
    pub category: SkillCategory,
}

/// Flatten detected skills into display tags with a capitalised label.
pub fn skill_tags(detected_skills: &DetectedSkills) -> Vec<SkillTag> {
    detected_skills
        .iter()
        .flat_map(|(category, skills)| {
            skills.iter().map(move |skill| SkillTag {
                label: capitalize(skill),
                category: *category,
            })
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
