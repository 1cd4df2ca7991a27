//! Static keyword tables for rule-based enrichment.
//!
//! Everything here is deterministic so that two enrichment paths fed the same text agree.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Sentiment;

const TECH_SKILLS: &[&str] = &[
    "Python", "Java", "JavaScript", "TypeScript", "Rust", "Go", "C++", "C#", "Ruby", "PHP",
    "Scala", "Kotlin", "Swift", "SQL", "PostgreSQL", "MySQL", "MongoDB", "Redis", "React",
    "Angular", "Vue", "Node.js", "Django", "Flask", "Spring", "AWS", "Azure", "GCP", "Docker",
    "Kubernetes", "Terraform", "Linux", "Git", "Spark", "Kafka", "Airflow", "Pandas",
    "TensorFlow", "PyTorch", "Machine Learning", "Excel", "Tableau", "Power BI", "GraphQL",
    "REST",
];

const BENEFITS: &[(&str, &str)] = &[
    ("health insurance", r"health (?:insurance|care|plan)|medical (?:insurance|coverage)"),
    ("dental", r"dental"),
    ("retirement plan", r"401\(?k\)?|pension|retirement plan"),
    ("equity", r"stock options?|equity|rsus?"),
    ("paid time off", r"paid time off|\bpto\b|paid vacation|unlimited vacation"),
    ("remote work", r"remote work|work from home|\bwfh\b"),
    ("flexible hours", r"flexible (?:hours|schedule|working)"),
    ("parental leave", r"parental leave|maternity|paternity"),
    ("bonus", r"\bbonus(?:es)?\b"),
    ("learning budget", r"learning budget|training budget|education stipend|conference budget"),
    ("gym", r"\bgym\b|wellness (?:allowance|stipend)"),
];

const CULTURE: &[(&str, &[&str])] = &[
    ("collaborative", &["collaborative", "collaboration", "teamwork", "team player"]),
    ("fast-paced", &["fast-paced", "fast paced", "startup", "dynamic environment"]),
    ("remote-first", &["remote-first", "distributed team", "async", "fully remote"]),
    ("learning", &["mentorship", "mentoring", "career growth", "learning culture"]),
    ("structured", &["enterprise", "compliance", "established processes", "regulated"]),
];

const POSITIVE: &[&str] = &[
    "great", "exciting", "innovative", "growth", "supportive", "collaborative", "flexible",
    "rewarding", "inclusive", "opportunity", "passionate", "award-winning", "friendly",
];

const NEGATIVE: &[&str] = &[
    "stressful", "demanding", "pressure", "overtime", "unpaid", "tight deadlines",
    "high turnover", "long hours", "weekends required",
];

const REQUIREMENT_CUES: &[&str] = &[
    "required",
    "must have",
    "must be",
    "experience with",
    "experience in",
    "proficiency",
    "proficient",
    "degree",
    "years of experience",
];

const MAX_REQUIREMENTS: usize = 10;
const MAX_REQUIREMENT_LEN: usize = 200;

/// Builds a case-insensitive whole-term pattern for a skill (`C++`, `Node.js` safe).
pub fn skill_pattern(skill: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)(?:^|[^\w+#.]){}(?:$|[^\w+#])",
        regex::escape(skill.trim())
    ))
}

static SKILL_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    TECH_SKILLS
        .iter()
        .filter_map(|skill| skill_pattern(skill).ok().map(|re| (*skill, re)))
        .collect()
});

static BENEFIT_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    BENEFITS
        .iter()
        .filter_map(|(name, pattern)| {
            Regex::new(&format!("(?i){pattern}"))
                .ok()
                .map(|re| (*name, re))
        })
        .collect()
});

static SENTENCE_SPLIT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[.\n;•]+").ok());

/// Known technical skills mentioned in `text`, in table order.
pub fn find_skills(text: &str) -> Vec<String> {
    SKILL_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Benefits mentioned in `text`, in table order.
pub fn find_benefits(text: &str) -> Vec<String> {
    BENEFIT_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Sentences that read like requirements.
pub fn find_requirements(text: &str) -> Vec<String> {
    let Some(split) = SENTENCE_SPLIT.as_ref() else {
        return Vec::new();
    };

    split
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() <= MAX_REQUIREMENT_LEN)
        .filter(|s| {
            let lower = s.to_lowercase();
            REQUIREMENT_CUES.iter().any(|cue| lower.contains(cue))
        })
        .take(MAX_REQUIREMENTS)
        .map(str::to_string)
        .collect()
}

/// Keyword polarity count; ties are neutral.
pub fn polarity(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let positive = POSITIVE.iter().filter(|w| lower.contains(*w)).count();
    let negative = NEGATIVE.iter().filter(|w| lower.contains(*w)).count();

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Dominant culture category, if any cue is present (ties go to the earlier category).
pub fn culture_signal(text: &str) -> Option<String> {
    let lower = text.to_lowercase();

    let mut best: Option<(&str, usize)> = None;
    for (name, cues) in CULTURE {
        let hits = cues.iter().filter(|c| lower.contains(*c)).count();
        if hits > 0 && best.is_none_or(|(_, top)| hits > top) {
            best = Some((name, hits));
        }
    }

    best.map(|(name, _)| name.to_string())
}

/// Case-insensitive dedup that keeps the first spelling seen.
pub fn dedup_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_skills_respects_term_boundaries() {
        let skills = find_skills("We use C++ and Go, not Golang. Also Node.js and SQL.");
        assert!(skills.contains(&"C++".to_string()));
        assert!(skills.contains(&"Go".to_string()));
        assert!(skills.contains(&"Node.js".to_string()));
        assert!(skills.contains(&"SQL".to_string()));
        assert!(!skills.contains(&"Rust".to_string()));
    }

    #[test]
    fn test_skill_pattern_does_not_match_inside_words() {
        let re = skill_pattern("Java").unwrap();
        assert!(re.is_match("java developer"));
        assert!(!re.is_match("javascript developer"));
    }

    #[test]
    fn test_find_benefits() {
        let benefits = find_benefits("Great health insurance, 401(k) match and a yearly bonus.");
        assert_eq!(benefits, vec!["health insurance", "retirement plan", "bonus"]);
    }

    #[test]
    fn test_find_requirements() {
        let reqs = find_requirements(
            "About us. Experience with Python is required. We like coffee; A degree in CS",
        );
        assert_eq!(
            reqs,
            vec!["Experience with Python is required", "A degree in CS"]
        );
    }

    #[test]
    fn test_polarity() {
        assert_eq!(polarity("A great, exciting team"), Sentiment::Positive);
        assert_eq!(polarity("Stressful, overtime expected"), Sentiment::Negative);
        assert_eq!(polarity("Great pay but stressful"), Sentiment::Neutral);
    }

    #[test]
    fn test_culture_signal() {
        assert_eq!(
            culture_signal("A fast-paced startup with teamwork"),
            Some("fast-paced".to_string())
        );
        assert_eq!(culture_signal("nothing here"), None);
    }

    #[test]
    fn test_dedup_preserving_order() {
        let out = dedup_preserving_order(
            ["Python", "SQL", "python", "Rust"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(out, vec!["Python", "SQL", "Rust"]);
    }
}
