//! Bounded-parallelism execution of conversion jobs.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::info;

use crate::discovery::RecordSet;
use crate::error::{IngestionError, Result};
use crate::job::{ConversionJob, JobResult};
use crate::record::FileRecord;

/// A fixed-size pool of conversion workers.
///
/// The pool owns its own threads instead of using the rayon global pool, so
/// the worker count is exactly what was configured.
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(IngestionError::InvalidConfig(
                "worker pool needs at least one worker".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("convert-{}", i))
            .build()
            .map_err(|e| IngestionError::InvalidConfig(format!("failed to build worker pool: {}", e)))?;

        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `job` over every record and block until all have finished.
    ///
    /// Completion order is unspecified; results come back in record id
    /// order, one per record.
    pub fn run(&self, records: &RecordSet, job: &ConversionJob) -> Vec<JobResult> {
        self.run_with(records, |record| job.run(record))
    }

    /// Like [`WorkerPool::run`] with an arbitrary per-record task.
    pub fn run_with<F>(&self, records: &RecordSet, task: F) -> Vec<JobResult>
    where
        F: Fn(&FileRecord) -> JobResult + Sync,
    {
        info!(records = records.len(), workers = self.workers, "Starting conversion pool");
        let items: Vec<&FileRecord> = records.values().collect();
        self.pool
            .install(|| items.par_iter().map(|record| task(record)).collect())
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::job::{JobFailure, JobSuccess};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    fn records(n: u64) -> RecordSet {
        (0..n)
            .map(|id| (id, FileRecord::new(id, "/in", format!("file_{}.nc", id))))
            .collect()
    }

    fn ok(record: &FileRecord) -> JobResult {
        Ok(JobSuccess {
            id: record.id,
            filename: record.filename.clone(),
            raster_path: "/out/x.tif".into(),
            sidecar_path: "/out/x.meta".into(),
            timestamps: vec![],
        })
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(WorkerPool::new(0).is_err());
    }

    #[test]
    fn test_every_record_attempted_once() {
        let pool = WorkerPool::new(3).unwrap();
        let set = records(25);
        let calls = AtomicUsize::new(0);

        let results = pool.run_with(&set, |record| {
            calls.fetch_add(1, Ordering::SeqCst);
            ok(record)
        });

        assert_eq!(calls.load(Ordering::SeqCst), 25);
        assert_eq!(results.len(), 25);
        let ids: Vec<u64> = results.iter().map(|r| r.as_ref().unwrap().id).collect();
        assert_eq!(ids, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_failures_do_not_suppress_others() {
        let pool = WorkerPool::new(3).unwrap();
        let set = records(10);

        let results = pool.run_with(&set, |record| {
            if record.id % 3 == 0 {
                Err(JobFailure {
                    id: record.id,
                    filename: record.filename.clone(),
                    kind: ErrorKind::SourceRead,
                    message: "boom".to_string(),
                })
            } else {
                ok(record)
            }
        });

        assert_eq!(results.len(), 10);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 4);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 6);
    }

    #[test]
    fn test_concurrency_bounded_by_workers() {
        let pool = WorkerPool::new(2).unwrap();
        assert_eq!(pool.workers(), 2);
        let set = records(8);
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let threads = Mutex::new(HashSet::new());

        pool.run_with(&set, |record| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            threads.lock().unwrap().insert(thread::current().id());
            thread::sleep(Duration::from_millis(10));
            active.fetch_sub(1, Ordering::SeqCst);
            ok(record)
        });

        assert!(peak.load(Ordering::SeqCst) <= pool.workers());
        assert!(threads.lock().unwrap().len() <= pool.workers());
    }

    #[test]
    fn test_empty_record_set() {
        let pool = WorkerPool::new(1).unwrap();
        assert!(pool.run_with(&RecordSet::new(), ok).is_empty());
    }
}
