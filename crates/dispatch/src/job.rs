//! Job-management API seam.
//!
//! The dispatcher only needs two capabilities from the external job system:
//! list the currently active jobs for the application, and submit a named
//! job. Everything after submission (state transitions, completion,
//! failure) is owned by the job system and never tracked here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Lifecycle state of an externally owned compute job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Submitted,
    Pending,
    Scheduled,
    Running,
    Queued,
    Success,
    Failed,
    Cancelling,
    Cancelled,
}

impl JobState {
    /// Whether a job in this state still occupies its partition.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobState::Submitted
                | JobState::Pending
                | JobState::Scheduled
                | JobState::Running
                | JobState::Queued
        )
    }
}

/// Minimal view of a job run returned by the listing call.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub name: String,
    pub state: JobState,
}

/// A job to submit: named after its partition, with the input and output
/// URIs as positional arguments. Entry point and resource profile are
/// fixed per deployment and owned by the [`JobApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSubmission {
    pub name: String,
    pub input_uri: String,
    pub output_uri: String,
}

#[async_trait]
pub trait JobApi: Send + Sync {
    /// List jobs currently in an active state for the target application.
    async fn list_active_jobs(&self) -> Result<Vec<JobSummary>, DispatchError>;

    /// Submit a new job run, returning its id.
    async fn submit(&self, submission: &JobSubmission) -> Result<String, DispatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_states() {
        for state in [
            JobState::Submitted,
            JobState::Pending,
            JobState::Scheduled,
            JobState::Running,
            JobState::Queued,
        ] {
            assert!(state.is_active());
        }
        for state in [
            JobState::Success,
            JobState::Failed,
            JobState::Cancelling,
            JobState::Cancelled,
        ] {
            assert!(!state.is_active());
        }
    }
}
