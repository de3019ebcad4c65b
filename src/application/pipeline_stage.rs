//! Linear stage machine for one search run
//!
//! `Idle → Fetching → Locating → Extracting → Normalizing → Done`, with a
//! fetch failure jumping straight to `Failed`. No stage is ever revisited.

use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Fetching,
    Locating,
    Extracting,
    Normalizing,
    Done,
    Failed { reason: String },
}

impl PipelineStage {
    /// The stage that follows on success; `None` once terminal
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Fetching),
            Self::Fetching => Some(Self::Locating),
            Self::Locating => Some(Self::Extracting),
            Self::Extracting => Some(Self::Normalizing),
            Self::Normalizing => Some(Self::Done),
            Self::Done | Self::Failed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed { .. })
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Fetching => write!(f, "Fetching"),
            Self::Locating => write!(f, "Locating"),
            Self::Extracting => write!(f, "Extracting"),
            Self::Normalizing => write!(f, "Normalizing"),
            Self::Done => write!(f, "Done"),
            Self::Failed { reason } => write!(f, "Failed({reason})"),
        }
    }
}

/// Tracks and logs the stage of a single run
#[derive(Debug)]
pub struct StageTracker {
    keyword: String,
    stage: PipelineStage,
    history: Vec<PipelineStage>,
}

impl StageTracker {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            stage: PipelineStage::Idle,
            history: vec![PipelineStage::Idle],
        }
    }

    pub fn current(&self) -> &PipelineStage {
        &self.stage
    }

    /// Every stage visited so far, `Idle` first
    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    /// Move to the next stage; a no-op once terminal
    pub fn advance(&mut self) -> &PipelineStage {
        if let Some(next) = self.stage.next() {
            self.enter(next);
        }
        &self.stage
    }

    /// Short-circuit to `Failed`; a no-op once terminal
    pub fn fail(&mut self, reason: impl fmt::Display) {
        if !self.stage.is_terminal() {
            self.enter(PipelineStage::Failed {
                reason: reason.to_string(),
            });
        }
    }

    fn enter(&mut self, next: PipelineStage) {
        debug!("[{}] {} → {}", self.keyword, self.stage, next);
        self.stage = next.clone();
        self.history.push(next);
    }
}
