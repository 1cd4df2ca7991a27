use serde::{Deserialize, Serialize};

/// Phases of one orchestrator run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    Stage1,
    Filter,
    Stage2,
    Combine,
    Done,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Init => "init",
            PipelineState::Stage1 => "stage1",
            PipelineState::Filter => "filter",
            PipelineState::Stage2 => "stage2",
            PipelineState::Combine => "combine",
            PipelineState::Done => "done",
        }
    }

    /// Moves forward only; `Stage2` may be skipped, nothing else.
    pub fn can_advance_to(&self, next: PipelineState) -> bool {
        match (self, next) {
            (PipelineState::Filter, PipelineState::Combine) => true,
            _ => (*self as u8) + 1 == next as u8,
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
