//! # Run Events
//!
//! Progress events emitted by the runner and streamed to the UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of run event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunEventKind {
    /// Pipeline started
    PipelineStarted,
    /// Stage started working
    StageStarted,
    /// Stage completed successfully
    StageCompleted,
    /// Stage failed, aborting the run
    StageFailed,
    /// Pipeline completed
    PipelineCompleted,
    /// Pipeline failed
    PipelineFailed,
}

/// An event in a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    /// Unique event ID
    pub id: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: RunEventKind,
    /// Task the event refers to, when stage-scoped
    #[serde(default)]
    pub task: Option<String>,
    /// Human-readable detail (e.g. the failure message)
    #[serde(default)]
    pub detail: Option<String>,
}

impl RunEvent {
    pub fn new(kind: RunEventKind) -> Self {
        Self {
            id: event_id(),
            timestamp: Utc::now(),
            kind,
            task: None,
            detail: None,
        }
    }

    pub fn with_task(mut self, task: &str) -> Self {
        self.task = Some(task.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Generate a simple unique id
fn event_id() -> String {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos();
    format!("{:x}-{:x}", nanos, rand_u32())
}

/// Simple random number (not cryptographic)
fn rand_u32() -> u32 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};
    RandomState::new().build_hasher().finish() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = RunEvent::new(RunEventKind::StageStarted).with_task("research");
        assert_eq!(event.kind, RunEventKind::StageStarted);
        assert_eq!(event.task.as_deref(), Some("research"));
        assert!(event.detail.is_none());
        assert!(!event.id.is_empty());
    }

    #[test]
    fn test_event_serialization_uses_snake_case() {
        let event = RunEvent::new(RunEventKind::PipelineCompleted);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("pipeline_completed"));
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = RunEvent::new(RunEventKind::PipelineStarted);
        let b = RunEvent::new(RunEventKind::PipelineStarted);
        assert_ne!(a.id, b.id);
    }
}
