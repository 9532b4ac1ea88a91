pub mod dispatcher;
pub mod emr;
pub mod error;
pub mod grouper;
pub mod job;
pub mod lease;
pub mod report;

pub use dispatcher::{JobDispatcher, PartitionOutcome};
pub use emr::EmrJobApi;
pub use error::DispatchError;
pub use grouper::{group_by_partition, GroupOutcome};
pub use job::{JobApi, JobState, JobSubmission, JobSummary};
pub use lease::LeaseRegistry;
pub use report::{BatchItemFailure, DispatchFailures, DispatchReport};
