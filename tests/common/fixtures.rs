//! Shared job and profile fixtures.

use std::sync::Arc;

use jobsift::model::{CandidateProfile, Job};

pub fn python_profile() -> Arc<CandidateProfile> {
    Arc::new(CandidateProfile::new(["Python"]))
}

pub fn data_profile() -> Arc<CandidateProfile> {
    Arc::new(CandidateProfile::new(["Python", "SQL", "Docker"]).with_title_keywords(["analyst"]))
}

/// Matches the Python profile; no disqualifiers.
pub fn python_job(id: &str) -> Job {
    Job::new(id, "Data Analyst")
        .with_company("Northwind Freight")
        .with_location("Remote")
        .with_url(format!("https://jobs.example.com/{id}"))
        .with_description(
            "We use Python and SQL for reporting. Experience with dashboards is required. \
             Collaborative team, health insurance and flexible hours.",
        )
}

/// No profile skill; passes on the base score alone.
pub fn plain_job(id: &str) -> Job {
    Job::new(id, "Operations Coordinator")
        .with_company("Northwind Freight")
        .with_location("Berlin")
        .with_description("Coordinate shipments and vendor schedules. Friendly team.")
}

/// Requires a language the profile does not speak.
pub fn german_job(id: &str) -> Job {
    Job::new(id, "Logistics Planner")
        .with_company("Northwind Freight")
        .with_description("Planning routes for our depots. Fluent German required.")
}

/// Senior title without entry-friendly wording.
pub fn senior_job(id: &str) -> Job {
    Job::new(id, "Senior Director of Operations")
        .with_company("Northwind Freight")
        .with_description("Lead the regional operations organisation. 10+ years of experience.")
}

/// Deterministic mix of every fixture kind.
pub fn mixed_jobs(n: usize) -> Vec<Job> {
    (0..n)
        .map(|i| {
            let id = format!("job-{i:03}");
            match i % 4 {
                0 => python_job(&id),
                1 => plain_job(&id),
                2 => german_job(&id),
                _ => senior_job(&id),
            }
        })
        .collect()
}
