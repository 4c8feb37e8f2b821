use serde::{Deserialize, Serialize};

use crate::skills::{DetectedSkills, SkillCategory};

const KNOWN_ENTERPRISES: &[&str] = &[
    "amazon", "google", "microsoft", "meta", "facebook", "apple", "netflix", "uber", "infosys",
    "tcs", "accenture", "cognizant", "wipro", "ibm", "adobe", "salesforce", "oracle", "linkedin",
    "goldman", "morgan", "jpmorgan", "samsung", "qualcomm", "intel", "nvidia", "tesla", "walmart",
    "airbnb", "stripe", "dropbox", "slack", "atlassian", "databricks",
];

/// Checked in order; the first industry with a matching keyword wins.
const INDUSTRY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "FinTech",
        &["banking", "finance", "fintech", "payment", "transaction", "crypto", "blockchain", "trading"],
    ),
    (
        "E-Commerce",
        &["ecommerce", "shopping", "retail", "commerce", "marketplace", "inventory"],
    ),
    (
        "Healthcare",
        &["healthcare", "health", "medical", "hospital", "clinic", "patient", "pharma", "wellness"],
    ),
    (
        "EdTech",
        &["education", "learning", "course", "student", "training", "online learning"],
    ),
    (
        "SaaS",
        &["saas", "cloud service", "subscription", "software as", "api platform"],
    ),
    (
        "Media & Entertainment",
        &["media", "entertainment", "streaming", "video", "music", "content"],
    ),
    ("Consulting", &["consulting", "business consulting", "management"]),
    (
        "IT Services",
        &["it services", "outsourcing", "managed services", "bpo", "ito"],
    ),
];

pub const DEFAULT_INDUSTRY: &str = "Technology Services";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanySize {
    Startup,
    #[serde(rename = "Mid-size")]
    MidSize,
    Enterprise,
}

impl CompanySize {
    pub fn as_str(self) -> &'static str {
        match self {
            CompanySize::Startup => "Startup",
            CompanySize::MidSize => "Mid-size",
            CompanySize::Enterprise => "Enterprise",
        }
    }
}

impl std::fmt::Display for CompanySize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiringFocus {
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub number: u32,
    pub title: String,
    pub description: String,
    pub focus: Vec<String>,
    pub duration: String,
    pub why: String,
}

/// Company profile plus the interview rounds selected for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyIntel {
    pub size: CompanySize,
    pub industry: String,
    pub hiring_focus: HiringFocus,
    #[serde(default)]
    pub round_mapping: Vec<Round>,
}

/// Classify by company name only. Never yields `MidSize`; that size is only
/// reachable through an explicit override or stored data.
pub fn infer_company_size(company_name: &str) -> CompanySize {
    let name = company_name.trim().to_lowercase();
    if name.is_empty() {
        return CompanySize::Startup;
    }

    if KNOWN_ENTERPRISES.iter().any(|ent| name.contains(ent)) {
        CompanySize::Enterprise
    } else {
        CompanySize::Startup
    }
}

/// Industry is inferred from the JD text; the company name is not consulted.
pub fn infer_industry(jd_text: &str, _company_name: &str) -> String {
    let text = jd_text.to_lowercase();

    INDUSTRY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(industry, _)| industry.to_string())
        .unwrap_or_else(|| DEFAULT_INDUSTRY.to_string())
}

/// Approximate head-count range shown next to the size.
pub fn get_company_size_label(size: CompanySize) -> &'static str {
    match size {
        CompanySize::Startup => "< 200",
        CompanySize::MidSize => "200 – 2,000",
        CompanySize::Enterprise => "2,000 +",
    }
}

pub fn get_hiring_focus(size: CompanySize) -> HiringFocus {
    let (title, description, skills): (&str, &str, [&str; 4]) = match size {
        CompanySize::Enterprise => (
            "Structured DSA + Core Fundamentals",
            "Large companies emphasize algorithmic problem-solving, system design, and deep CS fundamentals across multiple rounds.",
            ["DSA", "System Design", "Problem Solving", "Core CS"],
        ),
        CompanySize::MidSize => (
            "Balanced Technical + Practical Skills",
            "Mid-size companies balance structured coding interviews with practical project experience and domain expertise.",
            ["DSA", "Project Implementation", "Problem Solving", "Tech Stack"],
        ),
        CompanySize::Startup => (
            "Practical Problem Solving + Stack Depth",
            "Startups focus on practical coding ability, quick delivery, and deep expertise in their tech stack.",
            ["Practical Coding", "Stack Expertise", "Problem Solving", "Rapid Development"],
        ),
    };

    HiringFocus {
        title: title.to_string(),
        description: description.to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}

/// (title, description, focus, duration, why)
type RoundTemplate<'a> = (&'a str, &'a str, &'a [&'a str], &'a str, &'a str);

fn build_rounds(templates: &[RoundTemplate]) -> Vec<Round> {
    templates
        .iter()
        .zip(1..)
        .map(|(&(title, description, focus, duration, why), number)| Round {
            number,
            title: title.to_string(),
            description: description.to_string(),
            focus: focus.iter().map(|f| f.to_string()).collect(),
            duration: duration.to_string(),
            why: why.to_string(),
        })
        .collect()
}

/// Select the fixed round sequence for a company size and the detected
/// categories. Total: every combination yields a non-empty mapping numbered
/// from 1.
pub fn generate_round_mapping(
    size: CompanySize,
    _detected_skills: &DetectedSkills,
    detected_categories: &[SkillCategory],
) -> Vec<Round> {
    let has_dsa = detected_categories.contains(&SkillCategory::CoreCs);
    let has_web = detected_categories.contains(&SkillCategory::Web);
    let has_devops = detected_categories.contains(&SkillCategory::CloudDevOps);

    match size {
        CompanySize::Enterprise if has_dsa => {
            let design_focus: &[&str] = if has_web {
                &["System Design", "API Design", "Scalability"]
            } else {
                &["Architecture", "Optimization", "Design Patterns"]
            };
            build_rounds(&[
                (
                    "Online Test (DSA + Aptitude)",
                    "Timed coding challenges and aptitude questions in a proctored environment.",
                    &["DSA", "Time Management", "Aptitude"],
                    "90-120 mins",
                    "Screens for coding fundamentals and basic problem-solving ability across large candidate pool.",
                ),
                (
                    "Technical Interview (DSA + Core CS)",
                    "In-depth coding problems, complexity analysis, and core computer science concepts.",
                    &["DSA", "System Design", "Core CS Fundamentals"],
                    "60 mins",
                    "Deep dive into problem-solving approach, code quality, and theoretical understanding.",
                ),
                (
                    "Advanced Technical (Projects + Architecture)",
                    "Discuss real projects, system design, and architectural decisions.",
                    design_focus,
                    "45 mins",
                    "Validates ability to design and build production-level systems independently.",
                ),
                (
                    "HR & Cultural Fit",
                    "Behavioral interview covering work style, collaboration, and career goals.",
                    &["Communication", "Teamwork", "Adaptability"],
                    "30 mins",
                    "Ensures alignment with company culture and team dynamics.",
                ),
            ])
        }
        CompanySize::Enterprise => build_rounds(&[
            (
                "Initial Screening (General Coding)",
                "Basic coding problems and logical reasoning assessment.",
                &["Problem Solving", "Coding Basics"],
                "60 mins",
                "Evaluates foundational programming ability and logical thinking.",
            ),
            (
                "Technical Interview",
                "In-depth technical discussion and coding solutions.",
                &["Technical Skills", "Code Quality"],
                "60 mins",
                "Assesses depth of technical knowledge and coding proficiency.",
            ),
            (
                "Project Discussion + Design",
                "Deep dive into portfolio projects and design approach.",
                &["Project Experience", "Design Skills"],
                "45 mins",
                "Validates real-world project execution and design thinking.",
            ),
            (
                "HR & Managerial",
                "Behavioral and cultural fit interview.",
                &["Soft Skills", "Team Fit"],
                "30 mins",
                "Ensures cohesion with team and long-term potential.",
            ),
        ]),
        CompanySize::MidSize if has_web || has_devops => {
            let stack_focus: &[&str] = if has_web {
                &["Frontend", "Backend", "Database"]
            } else {
                &["Infrastructure", "Deployment"]
            };
            build_rounds(&[
                (
                    "Technical Coding (Full-Stack)",
                    "Practical coding challenge with emphasis on full-stack capability.",
                    stack_focus,
                    "90 mins",
                    "Tests practical ability to implement working solutions end-to-end.",
                ),
                (
                    "System Discussion & Architecture",
                    "Discuss approach, architecture decisions, and scalability considerations.",
                    &["System Design", "Technical Decision Making"],
                    "60 mins",
                    "Evaluates engineering maturity and ability to think about system design.",
                ),
                (
                    "Culture Fit & Projects",
                    "Informal discussion about work style, past projects, and team collaboration.",
                    &["Collaboration", "Project Experience", "Culture"],
                    "45 mins",
                    "Assesses team fit and practical project delivery experience.",
                ),
            ])
        }
        CompanySize::MidSize if has_dsa => build_rounds(&[
            (
                "Coding Challenge",
                "Medium-level DSA coding problems with time constraints.",
                &["DSA", "Problem Solving"],
                "75 mins",
                "Evaluates algorithmic thinking and coding ability.",
            ),
            (
                "Technical Round",
                "Discussion of approach, optimization, and related concepts.",
                &["Technical Knowledge", "System Thinking"],
                "60 mins",
                "Validates problem-solving approach and technical depth.",
            ),
            (
                "HR & Final Discussion",
                "Behavioral questions and final cultural fit discussion.",
                &["Communication", "Team Fit"],
                "30 mins",
                "Confirms mutual fit and discusses role expectations.",
            ),
        ]),
        CompanySize::MidSize => build_rounds(&[
            (
                "Technical Interview",
                "Practical coding and technical capability assessment.",
                &["Technical Skills", "Problem Solving"],
                "60 mins",
                "Evaluates baseline technical competency.",
            ),
            (
                "Project & Experience Discussion",
                "Deep dive into past projects and technical experience.",
                &["Project Experience", "Learning Ability"],
                "45 mins",
                "Validates real-world project delivery and growth trajectory.",
            ),
            (
                "HR Round",
                "Final cultural fit and role alignment discussion.",
                &["Culture", "Career Goals"],
                "30 mins",
                "Ensures alignment with role and company culture.",
            ),
        ]),
        CompanySize::Startup if has_web => build_rounds(&[
            (
                "Practical Coding Challenge",
                "Real-world project scenario on their tech stack (most likely React/Node).",
                &["React", "Node.js", "Practical Implementation"],
                "60-90 mins",
                "Startups need developers who can immediately contribute to live product.",
            ),
            (
                "System Discussion & Deep Dive",
                "Discuss approach, architecture, and scalability thinking.",
                &["Architecture", "Code Quality", "Scalability"],
                "45 mins",
                "Evaluates whether candidate thinks about real-world constraints.",
            ),
            (
                "Culture Fit & Team Synergy",
                "Informal discussion about work style, collaboration, and startup mentality.",
                &["Collaboration", "Adaptability", "Startup Mindset"],
                "45 mins",
                "Startup success depends heavily on team dynamics and adaptability.",
            ),
        ]),
        CompanySize::Startup if has_devops => build_rounds(&[
            (
                "Infrastructure Challenge",
                "Practical DevOps/Infrastructure scenario on their tools.",
                &["Docker", "Kubernetes", "CI/CD"],
                "60 mins",
                "Validates ability to quickly set up and manage infrastructure for agile deployment.",
            ),
            (
                "Architecture & Decision Making",
                "Discuss system architecture and technical decision-making.",
                &["System Design", "Problem Solving"],
                "45 mins",
                "Evaluates engineering judgment on practical tools and trade-offs.",
            ),
            (
                "Team Fit & Vision",
                "Discuss work style, past achievements, and alignment with startup vision.",
                &["Teamwork", "Vision Alignment"],
                "30 mins",
                "Startup success requires team players with shared vision.",
            ),
        ]),
        CompanySize::Startup => build_rounds(&[
            (
                "Coding + Problem-Solving",
                "Practical coding challenge focused on the core stack.",
                &["Practical Problem Solving", "Code Quality"],
                "60 mins",
                "Startups need pragmatic, self-sufficient developers.",
            ),
            (
                "Technical + Product Discussion",
                "Discuss past work, product thinking, and approach to challenges.",
                &["Product Sense", "Rapid Learning"],
                "45 mins",
                "Validates ability to learn quickly and contribute beyond code.",
            ),
            (
                "Culture & Team Chemistry",
                "Casual discussion about collaboration and fit with team.",
                &["Team Chemistry", "Flexibility"],
                "30 mins",
                "In startups, team cohesion is as important as technical skills.",
            ),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(rounds: &[Round]) {
        for (idx, round) in rounds.iter().enumerate() {
            assert_eq!(round.number, idx as u32 + 1);
        }
    }

    #[test]
    fn test_infer_company_size_known_enterprise() {
        assert_eq!(infer_company_size("Amazon"), CompanySize::Enterprise);
        assert_eq!(infer_company_size("  Goldman Sachs "), CompanySize::Enterprise);
    }

    #[test]
    fn test_infer_company_size_defaults_to_startup() {
        assert_eq!(infer_company_size(""), CompanySize::Startup);
        assert_eq!(infer_company_size("Startup Co"), CompanySize::Startup);
    }

    #[test]
    fn test_infer_company_size_is_substring_based() {
        // "metal" contains "meta"
        assert_eq!(infer_company_size("Metalworks Ltd"), CompanySize::Enterprise);
    }

    #[test]
    fn test_infer_industry_first_match_wins() {
        // Both FinTech ("payment") and E-Commerce ("retail") match
        let industry = infer_industry("Build retail payment flows", "");
        assert_eq!(industry, "FinTech");
    }

    #[test]
    fn test_infer_industry_default() {
        assert_eq!(infer_industry("", "Acme"), DEFAULT_INDUSTRY);
        assert_eq!(infer_industry("write code", "Acme"), DEFAULT_INDUSTRY);
    }

    #[test]
    fn test_company_size_serde_labels() {
        assert_eq!(
            serde_json::to_string(&CompanySize::MidSize).unwrap(),
            r#""Mid-size""#
        );
        let size: CompanySize = serde_json::from_str(r#""Enterprise""#).unwrap();
        assert_eq!(size, CompanySize::Enterprise);
    }

    #[test]
    fn test_company_size_labels() {
        assert_eq!(get_company_size_label(CompanySize::Startup), "< 200");
        assert_eq!(get_company_size_label(CompanySize::MidSize), "200 – 2,000");
        assert_eq!(get_company_size_label(CompanySize::Enterprise), "2,000 +");
    }

    #[test]
    fn test_hiring_focus_per_size() {
        let focus = get_hiring_focus(CompanySize::Enterprise);
        assert_eq!(focus.title, "Structured DSA + Core Fundamentals");
        assert_eq!(focus.skills.len(), 4);

        let focus = get_hiring_focus(CompanySize::Startup);
        assert!(focus.skills.contains(&"Rapid Development".to_string()));
    }

    #[test]
    fn test_enterprise_with_core_cs_has_four_rounds() {
        let rounds = generate_round_mapping(
            CompanySize::Enterprise,
            &DetectedSkills::new(),
            &[SkillCategory::CoreCs],
        );
        assert_eq!(rounds.len(), 4);
        assert_eq!(rounds[0].title, "Online Test (DSA + Aptitude)");
        assert_eq!(rounds[2].focus, vec!["Architecture", "Optimization", "Design Patterns"]);
        assert_contiguous(&rounds);
    }

    #[test]
    fn test_enterprise_with_core_cs_and_web_uses_api_focus() {
        let rounds = generate_round_mapping(
            CompanySize::Enterprise,
            &DetectedSkills::new(),
            &[SkillCategory::CoreCs, SkillCategory::Web],
        );
        assert_eq!(rounds[2].focus, vec!["System Design", "API Design", "Scalability"]);
    }

    #[test]
    fn test_startup_without_categories_has_three_rounds() {
        let rounds = generate_round_mapping(CompanySize::Startup, &DetectedSkills::new(), &[]);
        assert_eq!(rounds.len(), 3);
        assert_eq!(rounds[0].title, "Coding + Problem-Solving");
        assert_contiguous(&rounds);
    }

    #[test]
    fn test_startup_web_beats_devops() {
        let rounds = generate_round_mapping(
            CompanySize::Startup,
            &DetectedSkills::new(),
            &[SkillCategory::Web, SkillCategory::CloudDevOps],
        );
        assert_eq!(rounds[0].title, "Practical Coding Challenge");

        let rounds = generate_round_mapping(
            CompanySize::Startup,
            &DetectedSkills::new(),
            &[SkillCategory::CloudDevOps],
        );
        assert_eq!(rounds[0].title, "Infrastructure Challenge");
    }

    #[test]
    fn test_mid_size_branches() {
        let empty = DetectedSkills::new();

        let devops_only = generate_round_mapping(CompanySize::MidSize, &empty, &[SkillCategory::CloudDevOps]);
        assert_eq!(devops_only[0].focus, vec!["Infrastructure", "Deployment"]);

        let dsa = generate_round_mapping(CompanySize::MidSize, &empty, &[SkillCategory::CoreCs]);
        assert_eq!(dsa[0].title, "Coding Challenge");

        let fallback = generate_round_mapping(CompanySize::MidSize, &empty, &[SkillCategory::Testing]);
        assert_eq!(fallback[2].title, "HR Round");
    }

    #[test]
    fn test_every_combination_is_non_empty_and_numbered() {
        let empty = DetectedSkills::new();
        let category_sets: Vec<Vec<SkillCategory>> = vec![
            vec![],
            vec![SkillCategory::CoreCs],
            vec![SkillCategory::Web],
            vec![SkillCategory::CloudDevOps],
            vec![SkillCategory::CoreCs, SkillCategory::Web, SkillCategory::CloudDevOps],
            vec![SkillCategory::Data, SkillCategory::Testing],
        ];

        for size in [CompanySize::Startup, CompanySize::MidSize, CompanySize::Enterprise] {
            for categories in &category_sets {
                let rounds = generate_round_mapping(size, &empty, categories);
                assert!(rounds.len() == 3 || rounds.len() == 4);
                assert_contiguous(&rounds);
            }
        }
    }
}
