//! Precompiled built-in patterns for Stage 1.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{EducationLevel, RemoteCategory};

/// Wording that requires a specific working language, keyed by language.
const LANGUAGE_MARKERS: &[(&str, &str)] = &[
    (
        "german",
        r"(?i)\b(?:deutschkenntnisse|fließende?s? deutsch|verhandlungssicher(?:es)? deutsch|(?:fluent|native)(?: in)? german|german (?:is )?(?:required|mandatory)|wir suchen|ihre aufgaben)\b",
    ),
    (
        "french",
        r"(?i)(?:\bfrançais\b|\bmaîtrise du français\b|\b(?:fluent|native)(?: in)? french\b|\bfrench (?:is )?(?:required|mandatory)\b|\bnous recherchons\b)",
    ),
    (
        "spanish",
        r"(?i)(?:\bespañol\b|\b(?:fluent|native)(?: in)? spanish\b|\bspanish (?:is )?(?:required|mandatory)\b|\bbuscamos\b)",
    ),
    (
        "dutch",
        r"(?i)\b(?:nederlands|(?:fluent|native)(?: in)? dutch|dutch (?:is )?(?:required|mandatory)|wij zoeken)\b",
    ),
];

const INDUSTRIES: &[(&str, &str)] = &[
    (
        "technology",
        r"(?i)\b(?:software|saas|cloud|platform|developer tools|cybersecurity)\b",
    ),
    ("finance", r"(?i)\b(?:bank(?:ing)?|fintech|financial|insurance|trading)\b"),
    ("healthcare", r"(?i)\b(?:healthcare|medical|hospital|pharma\w*|biotech)\b"),
    ("retail", r"(?i)\b(?:retail|e-?commerce|marketplace)\b"),
    ("education", r"(?i)\b(?:university|school|education|edtech)\b"),
];

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

fn compile_table(table: &[(&'static str, &str)]) -> Vec<(&'static str, Regex)> {
    table
        .iter()
        .filter_map(|(key, pattern)| compile(pattern).map(|re| (*key, re)))
        .collect()
}

static LANGUAGES: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| compile_table(LANGUAGE_MARKERS));

static INDUSTRY: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| compile_table(INDUSTRIES));

static SENIORITY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?i)\b(?:senior|sr\.?|lead|principal|staff|head of|director|vp)\b")
});

static ENTRY_FRIENDLY: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)\b(?:junior|entry|associate|coordinator|analyst)\b"));

static YEARS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?i)\b(\d{1,2})\s*\+?\s*(?:(?:-|to)\s*\d{1,2}\s*\+?\s*)?years?\b")
});

static TECH_COMPANY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?i)\b(?:tech\w*|software|labs?|systems|digital|data|ai|cloud|analytics|robotics)\b")
});

static DOCTORATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)\b(?:ph\.?\s?d|doctorate|doctoral)\b"));
static MASTER: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)\b(?:master'?s|msc|m\.sc|mba)\b"));
static BACHELOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)\b(?:bachelor'?s|bsc|b\.sc|undergraduate degree)\b"));

static HYBRID: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)\bhybrid\b"));
static REMOTE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)\b(?:remote|work from home|wfh|anywhere)\b"));
static ONSITE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)\b(?:on-?site|in[- ]office|in person)\b"));

fn matches(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

/// Languages whose markers appear in `text`.
pub fn required_languages(text: &str) -> Vec<&'static str> {
    LANGUAGES
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(lang, _)| *lang)
        .collect()
}

pub fn is_senior_title(title: &str) -> bool {
    matches(&SENIORITY, title)
}

pub fn has_entry_friendly_terms(text: &str) -> bool {
    matches(&ENTRY_FRIENDLY, text)
}

pub fn is_tech_company(company: &str) -> bool {
    matches(&TECH_COMPANY, company)
}

/// Smallest year count mentioned next to "year(s)".
pub fn required_years(text: &str) -> Option<u32> {
    YEARS.as_ref().and_then(|re| {
        re.captures_iter(text)
            .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
            .min()
    })
}

/// Highest education level mentioned.
pub fn education(text: &str) -> EducationLevel {
    if matches(&DOCTORATE, text) {
        EducationLevel::Doctorate
    } else if matches(&MASTER, text) {
        EducationLevel::Master
    } else if matches(&BACHELOR, text) {
        EducationLevel::Bachelor
    } else {
        EducationLevel::None
    }
}

/// Hybrid wins over remote ("hybrid remote" is hybrid).
pub fn remote_category(text: &str) -> RemoteCategory {
    if matches(&HYBRID, text) {
        RemoteCategory::Hybrid
    } else if matches(&REMOTE, text) {
        RemoteCategory::Remote
    } else if matches(&ONSITE, text) {
        RemoteCategory::Onsite
    } else {
        RemoteCategory::Unspecified
    }
}

pub fn industry(text: &str) -> Option<String> {
    INDUSTRY
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(name, _)| name.to_string())
}
