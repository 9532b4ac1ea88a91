//! EMR Serverless implementation of the job API.
//!
//! Wraps the AWS SDK client and adds next-token paging for listings plus
//! the deployment's fixed spark resource profile on submissions.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_emrserverless::types::{
    Configuration, ConfigurationOverrides, JobDriver, JobRunMode, JobRunState, SparkSubmit,
};
use aws_sdk_emrserverless::Client;
use tracing::{debug, info};

use coinpulse_core::config::EmrConfig;

use crate::error::DispatchError;
use crate::job::{JobApi, JobState, JobSubmission, JobSummary};

/// Page size for job-run listings.
const LIST_PAGE_SIZE: i32 = 50;

/// Fixed resource profile applied to every fusion job run.
const EXECUTOR_INSTANCES: &str = "2";
const EXECUTOR_MEMORY: &str = "2G";
const EXECUTOR_CORES: &str = "2";
const INITIAL_EXECUTORS: &str = "1";
const MAX_EXECUTORS: &str = "3";

fn active_states() -> [JobRunState; 5] {
    [
        JobRunState::Submitted,
        JobRunState::Pending,
        JobRunState::Scheduled,
        JobRunState::Running,
        JobRunState::Queued,
    ]
}

fn map_state(state: &JobRunState) -> JobState {
    match state.as_str() {
        "SUBMITTED" => JobState::Submitted,
        "PENDING" => JobState::Pending,
        "SCHEDULED" => JobState::Scheduled,
        "RUNNING" => JobState::Running,
        "QUEUED" => JobState::Queued,
        "SUCCESS" => JobState::Success,
        "FAILED" => JobState::Failed,
        "CANCELLING" => JobState::Cancelling,
        // Anything unrecognised is treated as not occupying the partition.
        _ => JobState::Cancelled,
    }
}

/// EMR Serverless job API client.
pub struct EmrJobApi {
    client: Client,
    config: EmrConfig,
    data_bucket: String,
}

impl EmrJobApi {
    /// Create a client for the configured application.
    pub async fn new(
        region: &str,
        config: &EmrConfig,
        data_bucket: &str,
    ) -> Result<Self, DispatchError> {
        if !config.is_configured() {
            return Err(DispatchError::JobApi(
                "EMR application id or execution role not configured".into(),
            ));
        }

        let region = aws_sdk_emrserverless::config::Region::new(region.to_string());
        let aws_cfg = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        let client = Client::new(&aws_cfg);

        info!(
            application_id = %config.application_id,
            entry_point = %config.entry_point,
            "EMR Serverless client initialised"
        );

        Ok(Self {
            client,
            config: config.clone(),
            data_bucket: data_bucket.to_string(),
        })
    }
}

#[async_trait]
impl JobApi for EmrJobApi {
    async fn list_active_jobs(&self) -> Result<Vec<JobSummary>, DispatchError> {
        let mut jobs = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_job_runs()
                .application_id(&self.config.application_id)
                .mode(JobRunMode::Batch)
                .max_results(LIST_PAGE_SIZE);
            for state in active_states() {
                req = req.states(state);
            }
            if let Some(ref token) = next_token {
                req = req.next_token(token);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| DispatchError::JobApi(format!("list_job_runs failed: {e:?}")))?;

            for run in resp.job_runs() {
                jobs.push(JobSummary {
                    name: run.name().unwrap_or_default().to_string(),
                    state: map_state(run.state()),
                });
            }

            match resp.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(count = jobs.len(), "listed active job runs");
        Ok(jobs)
    }

    async fn submit(&self, submission: &JobSubmission) -> Result<String, DispatchError> {
        let entry_point = format!("s3://{}/{}", self.data_bucket, self.config.entry_point);
        let archive = format!(
            "s3://{}/{}#environment",
            self.data_bucket, self.config.environment_archive
        );

        let spark = SparkSubmit::builder()
            .entry_point(entry_point)
            .entry_point_arguments(&submission.input_uri)
            .entry_point_arguments(&submission.output_uri)
            .build()
            .map_err(|e| DispatchError::JobApi(format!("invalid spark submit: {e}")))?;

        let spark_defaults = Configuration::builder()
            .classification("spark-defaults")
            .properties("spark.executor.instances", EXECUTOR_INSTANCES)
            .properties("spark.executor.memory", EXECUTOR_MEMORY)
            .properties("spark.executor.cores", EXECUTOR_CORES)
            .properties("spark.dynamicAllocation.initialExecutors", INITIAL_EXECUTORS)
            .properties("spark.dynamicAllocation.maxExecutors", MAX_EXECUTORS)
            .properties("spark.archives", archive)
            .build()
            .map_err(|e| DispatchError::JobApi(format!("invalid spark configuration: {e}")))?;

        let overrides = ConfigurationOverrides::builder()
            .application_configuration(spark_defaults)
            .build();

        let resp = self
            .client
            .start_job_run()
            .name(&submission.name)
            .application_id(&self.config.application_id)
            .execution_role_arn(&self.config.execution_role_arn)
            .job_driver(JobDriver::SparkSubmit(spark))
            .configuration_overrides(overrides)
            .send()
            .await
            .map_err(|e| DispatchError::JobApi(format!("start_job_run failed: {e:?}")))?;

        Ok(resp.job_run_id().to_string())
    }
}
