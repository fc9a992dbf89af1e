//! Thread-based batch runtime.
//!
//! Identifiers are independent: each worker takes one identifier's hit
//! set through the engine with no shared state beyond the result store,
//! whose single-decision insert keeps concurrent duplicates out. The pool
//! is bounded: jobs flow through a bounded channel so a large submission
//! cannot balloon memory.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::{InferenceEngine, InferenceOutcome};
use crate::error::{InferenceError, ValidationError};
use crate::header::SequenceMap;
use crate::hit::HitRecord;

/// Identifier of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Creates a new random run ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Batch runtime configuration.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of worker threads.
    pub workers: usize,

    /// Maximum queued jobs.
    pub queue_capacity: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 256,
        }
    }
}

/// One identifier's work item.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchJob {
    input_id: String,
    hits: Vec<HitRecord>,
}

impl BatchJob {
    /// Creates a job for one identifier.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyInputId` if the identifier is empty
    /// or whitespace-only.
    pub fn new(input_id: impl Into<String>, hits: Vec<HitRecord>) -> Result<Self, ValidationError> {
        let input_id = input_id.into();
        if input_id.trim().is_empty() {
            return Err(ValidationError::EmptyInputId);
        }
        Ok(Self { input_id, hits })
    }

    /// The job's input identifier.
    #[must_use]
    pub fn input_id(&self) -> &str {
        &self.input_id
    }
}

/// Per-identifier outcome inside a batch report.
pub type JobOutcome = Result<InferenceOutcome, InferenceError>;

/// Report of one batch run, in job submission order.
#[derive(Debug)]
pub struct BatchReport {
    /// Identifier of this run.
    pub run_id: RunId,

    /// One `(input_id, outcome)` entry per submitted job.
    pub outcomes: Vec<(String, JobOutcome)>,
}

impl BatchReport {
    /// Number of newly inferred results.
    #[must_use]
    pub fn inferred(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, Ok(InferenceOutcome::Inferred(_))))
            .count()
    }

    /// Number of identifiers skipped as already processed.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, Ok(InferenceOutcome::AlreadyProcessed { .. })))
            .count()
    }

    /// Number of identifiers that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_err())
            .count()
    }
}

enum WorkerMessage {
    Done {
        index: usize,
        input_id: String,
        outcome: JobOutcome,
    },
}

/// Worker pool running one engine over many identifiers.
pub struct BatchRunner {
    engine: Arc<InferenceEngine>,
    config: BatchConfig,
}

impl BatchRunner {
    /// Creates a runner with the default configuration.
    #[must_use]
    pub fn new(engine: Arc<InferenceEngine>) -> Self {
        Self {
            engine,
            config: BatchConfig::default(),
        }
    }

    /// Creates a runner with a custom configuration.
    #[must_use]
    pub fn with_config(engine: Arc<InferenceEngine>, config: BatchConfig) -> Self {
        Self { engine, config }
    }

    /// Processes every job and returns the report in submission order.
    ///
    /// Worker threads live only for the duration of the call. A failing
    /// identifier never aborts the batch: its error lands in the report
    /// and the remaining jobs keep flowing.
    #[must_use]
    pub fn run(&self, jobs: Vec<BatchJob>, sequences: &Arc<SequenceMap>) -> BatchReport {
        let run_id = RunId::new();
        let total = jobs.len();
        info!(%run_id, jobs = total, workers = self.config.workers, "batch run started");

        let workers = self.config.workers.max(1);
        let queue_capacity = self.config.queue_capacity.max(1);
        let (job_tx, job_rx) = bounded::<(usize, BatchJob)>(queue_capacity);
        let (result_tx, result_rx) = bounded::<WorkerMessage>(queue_capacity);

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(workers);
        for idx in 0..workers {
            let job_rx: Receiver<(usize, BatchJob)> = job_rx.clone();
            let result_tx: Sender<WorkerMessage> = result_tx.clone();
            let engine = Arc::clone(&self.engine);
            let sequences = Arc::clone(sequences);
            let handle = thread::Builder::new()
                .name(format!("profunc-worker-{idx}"))
                .spawn(move || {
                    while let Ok((index, job)) = job_rx.recv() {
                        let outcome = engine.infer(&job.input_id, &job.hits, &sequences);
                        let message = WorkerMessage::Done {
                            index,
                            input_id: job.input_id,
                            outcome,
                        };
                        if result_tx.send(message).is_err() {
                            break;
                        }
                    }
                })
                .expect("failed to spawn profunc worker");
            handles.push(handle);
        }
        // Workers hold the only remaining clones; the run loop's receive
        // side must observe disconnect once they finish.
        drop(result_tx);
        drop(job_rx);

        // Feed from a separate thread so a queue larger than the channel
        // capacity cannot deadlock against the collection loop below.
        let feeder = thread::spawn(move || {
            for (index, job) in jobs.into_iter().enumerate() {
                if job_tx.send((index, job)).is_err() {
                    break;
                }
            }
        });

        let mut slots: Vec<Option<(String, JobOutcome)>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        for _ in 0..total {
            match result_rx.recv() {
                Ok(WorkerMessage::Done {
                    index,
                    input_id,
                    outcome,
                }) => {
                    if let Err(error) = &outcome {
                        warn!(input_id = %input_id, %error, "identifier failed");
                    }
                    slots[index] = Some((input_id, outcome));
                }
                Err(_) => break,
            }
        }

        let _ = feeder.join();
        for handle in handles {
            let _ = handle.join();
        }

        let outcomes: Vec<(String, JobOutcome)> = slots.into_iter().flatten().collect();
        let report = BatchReport { run_id, outcomes };
        info!(
            %run_id,
            inferred = report.inferred(),
            skipped = report.skipped(),
            failed = report.failed(),
            "batch run finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryResultStore, ResultStore};

    fn hit(description: &str, similarity: f64) -> HitRecord {
        HitRecord::new(description, "AF-P0001-F1", 1.0, similarity).unwrap()
    }

    fn protease_hits() -> Vec<HitRecord> {
        vec![
            hit("Serine protease", 0.9),
            hit("Cysteine protease", 0.8),
            hit("Aspartic protease", 0.85),
        ]
    }

    fn runner_with_store() -> (BatchRunner, Arc<InMemoryResultStore>) {
        let store = Arc::new(InMemoryResultStore::new());
        let engine = Arc::new(InferenceEngine::new(store.clone()));
        (BatchRunner::new(engine), store)
    }

    #[test]
    fn test_empty_input_id_rejected() {
        assert!(matches!(
            BatchJob::new("  ", Vec::new()),
            Err(ValidationError::EmptyInputId)
        ));
    }

    #[test]
    fn test_batch_processes_all_jobs() {
        let (runner, store) = runner_with_store();

        let mut sequences = SequenceMap::new();
        let mut jobs = Vec::new();
        for i in 0..10 {
            let id = format!("A{i}");
            sequences.insert(&id, "MKTAYIAKQR");
            jobs.push(BatchJob::new(id, protease_hits()).unwrap());
        }

        let report = runner.run(jobs, &Arc::new(sequences));
        assert_eq!(report.outcomes.len(), 10);
        assert_eq!(report.inferred(), 10);
        assert_eq!(report.skipped(), 0);
        assert_eq!(report.failed(), 0);
        assert_eq!(store.len().unwrap(), 10);
    }

    #[test]
    fn test_report_preserves_submission_order() {
        let (runner, _store) = runner_with_store();

        let mut sequences = SequenceMap::new();
        let mut jobs = Vec::new();
        for i in 0..16 {
            let id = format!("A{i:02}");
            sequences.insert(&id, "MKTAYIAKQR");
            jobs.push(BatchJob::new(id, protease_hits()).unwrap());
        }

        let report = runner.run(jobs, &Arc::new(sequences));
        let ids: Vec<&str> = report.outcomes.iter().map(|(id, _)| id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_failures_are_isolated() {
        let (runner, store) = runner_with_store();

        let mut sequences = SequenceMap::new();
        sequences.insert("GOOD", "MKTAYIAKQR");
        sequences.insert("EMPTY", "MKTAYIAKQR");
        let jobs = vec![
            BatchJob::new("GOOD", protease_hits()).unwrap(),
            BatchJob::new("EMPTY", Vec::new()).unwrap(),
            BatchJob::new("NOSEQ", protease_hits()).unwrap(),
        ];

        let report = runner.run(jobs, &Arc::new(sequences));
        assert_eq!(report.inferred(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(store.len().unwrap(), 1);

        assert!(matches!(
            report.outcomes[1].1,
            Err(InferenceError::EmptyInput)
        ));
        assert!(matches!(
            report.outcomes[2].1,
            Err(InferenceError::MissingSequenceRecord { .. })
        ));
    }

    #[test]
    fn test_duplicate_identifiers_store_once() {
        let (runner, store) = runner_with_store();

        let mut sequences = SequenceMap::new();
        sequences.insert("A1", "MKTAYIAKQR");
        let jobs = (0..8)
            .map(|_| BatchJob::new("A1", protease_hits()).unwrap())
            .collect();

        let report = runner.run(jobs, &Arc::new(sequences));
        assert_eq!(report.inferred(), 1);
        assert_eq!(report.skipped(), 7);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_single_worker_matches_parallel_results() {
        let mut sequences = SequenceMap::new();
        let mut jobs = Vec::new();
        for i in 0..6 {
            let id = format!("A{i}");
            sequences.insert(&id, "MKTAYIAKQR");
            jobs.push(BatchJob::new(id, protease_hits()).unwrap());
        }
        let sequences = Arc::new(sequences);

        let run = |workers: usize| {
            let store = Arc::new(InMemoryResultStore::new());
            let engine = Arc::new(InferenceEngine::new(store.clone()));
            let config = BatchConfig {
                workers,
                queue_capacity: 2,
            };
            let report = BatchRunner::with_config(engine, config).run(jobs.clone(), &sequences);
            let mut functions: Vec<(String, String)> = store
                .snapshot()
                .unwrap()
                .into_iter()
                .map(|row| (row.result.input_id, row.result.inferred_function))
                .collect();
            functions.sort();
            (report.inferred(), functions)
        };

        assert_eq!(run(1), run(4));
    }
}
