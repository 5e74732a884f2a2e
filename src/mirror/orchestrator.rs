//! Bounded parallel mirroring of a repository list
//!
//! Each repository becomes one blocking job on tokio's blocking pool. A
//! semaphore caps how many jobs run at once; results are collected in
//! completion order by the calling task, which is also the only place the
//! progress counters are touched.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use super::bucket::{bucket_for, partition};
use super::credentials::embed_token;
use super::destination::repo_destination;
use super::operation::{MirrorJob, Mirrorer};
use super::progress::{NoopProgress, ProgressCounter, ProgressEvent, ProgressReporter};
use super::{MirrorResult, RepositoryDescriptor};

/// Per-run inputs to the orchestrator.
#[derive(Clone)]
pub struct RunOptions {
    /// Directory holding all mirrors
    pub backup_root: PathBuf,
    /// Token embedded into HTTPS transport URLs
    pub token: String,
    /// Maximum concurrently running mirror operations (values below 1 mean 1)
    pub concurrency: usize,
    /// Report `skipped` for everything without touching disk or network
    pub dry_run: bool,
    /// Group path used for bucketing
    pub group_root: String,
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("backup_root", &self.backup_root)
            .field("token", &"***")
            .field("concurrency", &self.concurrency)
            .field("dry_run", &self.dry_run)
            .field("group_root", &self.group_root)
            .finish()
    }
}

/// Bucket, repository and destination of a job not yet collected.
type PendingJob = (String, RepositoryDescriptor, PathBuf);

/// Failed results for jobs whose task ended without reporting back.
fn unfinished_results(
    pending: BTreeMap<usize, PendingJob>,
) -> impl Iterator<Item = (String, MirrorResult)> {
    pending.into_values().map(|(bucket, repository, destination)| {
        let result = MirrorResult::failed(repository, destination, "mirror task aborted");
        (bucket, result)
    })
}

/// Runs mirror operations over a repository list.
pub struct Orchestrator {
    mirrorer: Arc<dyn Mirrorer>,
    progress: Arc<dyn ProgressReporter>,
}

impl Orchestrator {
    pub fn new(mirrorer: Arc<dyn Mirrorer>) -> Self {
        Self {
            mirrorer,
            progress: Arc::new(NoopProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Build the job for one repository.
    fn job_for(repository: &RepositoryDescriptor, options: &RunOptions) -> MirrorJob {
        MirrorJob {
            repository: repository.clone(),
            destination: repo_destination(&options.backup_root, &repository.path_with_namespace),
            remote: embed_token(&repository.http_url_to_repo, &options.token),
            dry_run: options.dry_run,
        }
    }

    /// Mirror every repository and return one result per repository, in
    /// completion order.
    pub async fn run(
        &self,
        repositories: &[RepositoryDescriptor],
        options: &RunOptions,
    ) -> Vec<MirrorResult> {
        let total = repositories.len();
        let buckets = partition(repositories, &options.group_root);
        let bucket_sizes: Vec<(String, usize)> =
            buckets.iter().map(|b| (b.name.clone(), b.len())).collect();
        let mut bucket_progress: HashMap<String, ProgressCounter> = bucket_sizes
            .iter()
            .map(|(name, size)| (name.clone(), ProgressCounter::new(*size)))
            .collect();
        let mut overall = ProgressCounter::new(total);

        let concurrency = options.concurrency.max(1);
        debug!(total, concurrency, buckets = buckets.len(), "starting mirror run");
        self.progress.start(total, &bucket_sizes);

        let limit = Arc::new(Semaphore::new(concurrency));
        let mut join_set: JoinSet<(usize, MirrorResult)> = JoinSet::new();
        // Jobs whose result has not been collected yet, by submission index
        let mut pending: BTreeMap<usize, PendingJob> = BTreeMap::new();

        for (index, repository) in repositories.iter().enumerate() {
            let job = Self::job_for(repository, options);
            let bucket = bucket_for(&repository.path_with_namespace, &options.group_root);
            pending.insert(
                index,
                (bucket, job.repository.clone(), job.destination.clone()),
            );
            let mirrorer = Arc::clone(&self.mirrorer);
            let limit = Arc::clone(&limit);

            join_set.spawn(async move {
                // The semaphore is never closed, so acquiring cannot fail.
                let _permit = limit.acquire_owned().await;
                let repository = job.repository.clone();
                let destination = job.destination.clone();

                let handle = tokio::task::spawn_blocking(move || mirrorer.mirror(&job));
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => MirrorResult::failed(
                        repository,
                        destination,
                        format!("mirror worker crashed: {}", e),
                    ),
                };
                (index, result)
            });
        }

        let mut results = Vec::with_capacity(total);
        let mut record = |bucket: String, result: MirrorResult| {
            overall.advance();
            let counter = bucket_progress
                .entry(bucket.clone())
                .or_insert_with(|| ProgressCounter::new(0));
            counter.advance();

            self.progress.advance(&ProgressEvent {
                result: &result,
                bucket: &bucket,
                overall,
                bucket_progress: *counter,
            });
            results.push(result);
        };

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => {
                    if let Some((bucket, _, _)) = pending.remove(&index) {
                        record(bucket, result);
                    }
                }
                Err(e) => error!(error = %e, "mirror task aborted"),
            }
        }

        // Tasks lost to a join error still yield exactly one result each
        for (bucket, result) in unfinished_results(pending) {
            record(bucket, result);
        }

        self.progress.finish();
        debug!("Clone/update completed for {} projects", results.len());
        results
    }
}
