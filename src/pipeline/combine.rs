use std::sync::Arc;

use crate::enrichment::lexicon::dedup_preserving_order;
use crate::model::{
    Job, Recommendation, Stage1Result, Stage2Result, Stage2SkipReason, TwoStageResult,
};

/// Merges the stage outputs for one job.
///
/// `final_compatibility` is the Stage-2 score when present, otherwise the Stage-1 score.
/// Jobs that failed the Stage-1 filter are always `skip`.
pub fn combine(
    job: Arc<Job>,
    stage1: Stage1Result,
    stage2: Option<Stage2Result>,
    skip_reason: Option<Stage2SkipReason>,
) -> TwoStageResult {
    let final_compatibility = stage2
        .as_ref()
        .map_or(stage1.basic_compatibility, |s2| s2.semantic_compatibility);

    let final_skills = dedup_preserving_order(
        stage1
            .basic_skills
            .iter()
            .chain(stage2.iter().flat_map(|s2| s2.semantic_skills.iter()))
            .cloned(),
    );
    let final_requirements = dedup_preserving_order(
        stage1.derived_requirements().into_iter().chain(
            stage2
                .iter()
                .flat_map(|s2| s2.contextual_requirements.iter().cloned()),
        ),
    );

    let recommendation = if stage1.passes_filter {
        Recommendation::from_score(final_compatibility)
    } else {
        Recommendation::Skip
    };

    let total_processing_time = stage1.processing_time
        + stage2
            .as_ref()
            .map(|s2| s2.processing_time)
            .unwrap_or_default();

    let stages_completed = if stage2.is_some() { 2 } else { 1 };
    let stage2_skip_reason = if stage2.is_some() { None } else { skip_reason };

    TwoStageResult {
        job_id: job.id.clone(),
        url: job.url.clone(),
        job,
        stage1,
        stage2,
        final_compatibility,
        final_skills,
        final_requirements,
        recommendation,
        stages_completed,
        total_processing_time,
        stage2_skip_reason,
    }
}
