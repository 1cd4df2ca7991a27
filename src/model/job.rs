use serde::{Deserialize, Serialize};

/// Lifecycle status values this crate reads or writes.
pub mod status {
    /// Freshly harvested, waiting for analysis.
    pub const SCRAPED: &str = "scraped";
    /// Analysis finished and fields were written back.
    pub const PROCESSED: &str = "processed";
    /// Analysis failed; an explicit error record was written back.
    pub const PROCESSING_ERROR: &str = "processing_error";
}

/// A harvested job posting (supplied by the discovery subsystem).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Stable identifier assigned by the store.
    pub id: String,
    /// Posting title.
    pub title: String,
    /// Hiring company.
    #[serde(default)]
    pub company: String,
    /// Free-form location string.
    #[serde(default)]
    pub location: String,
    /// Full description text.
    #[serde(default)]
    pub description: String,
    /// Source URL.
    #[serde(default)]
    pub url: String,
    /// Lifecycle status (see [`status`]).
    #[serde(default)]
    pub status: String,
}

impl Job {
    /// Creates a job in the [`status::SCRAPED`] state.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company: String::new(),
            location: String::new(),
            description: String::new(),
            url: String::new(),
            status: status::SCRAPED.to_string(),
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Title and description joined; the text every scorer looks at.
    pub fn analysis_text(&self) -> String {
        format!("{}\n{}", self.title, self.description)
    }
}

/// The candidate a batch of jobs is ranked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// Skills to look for (matched case-insensitively on word boundaries).
    pub skills: Vec<String>,
    /// Keywords that make a title relevant (each hit adds a small bonus).
    #[serde(default)]
    pub title_keywords: Vec<String>,
    /// Languages the candidate works in; postings requiring others are disqualified.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

fn default_languages() -> Vec<String> {
    vec!["english".to_string()]
}

impl Default for CandidateProfile {
    fn default() -> Self {
        Self {
            skills: Vec::new(),
            title_keywords: Vec::new(),
            languages: default_languages(),
        }
    }
}

impl CandidateProfile {
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skills: skills.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_title_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.title_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if the candidate works in `language` (case-insensitive).
    pub fn speaks(&self, language: &str) -> bool {
        self.languages
            .iter()
            .any(|l| l.eq_ignore_ascii_case(language))
    }

    /// Short text describing the profile, used as the semantic query.
    pub fn query_text(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if !self.title_keywords.is_empty() {
            parts.push(self.title_keywords.join(", "));
        }
        if !self.skills.is_empty() {
            parts.push(format!("Skills: {}", self.skills.join(", ")));
        }
        parts.join("\n")
    }
}
