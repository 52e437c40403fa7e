//! Bounded-concurrency task execution with per-task failure isolation.
//!
//! Runs N independent units of work with at most `max_workers` executing
//! at any instant. One failing task never cancels its siblings; its error
//! is captured in place in the result vector, which is always ordered by
//! input position regardless of completion order.
//!
//! Two entry points share the same contract:
//!
//! - [`ParallelExecutor::run_sync`] for blocking callers (scoped worker
//!   threads pulling from a shared queue)
//! - [`ParallelExecutor::run_async`] for callers already inside a tokio
//!   runtime (semaphore-capped futures)

use std::collections::VecDeque;
use std::future::Future;
use std::sync::mpsc;
use std::sync::Arc;

use futures_util::future::join_all;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Default worker cap.
pub const DEFAULT_MAX_WORKERS: usize = 3;

/// A captured per-task failure.
///
/// Carries the task description for reporting and the original error
/// for callers that need to inspect or downcast it.
#[derive(Error, Debug)]
#[error("Task '{description}' failed: {source}")]
pub struct TaskError {
    /// Human-readable description of the failed task.
    pub description: String,
    /// The underlying error the task produced.
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl TaskError {
    /// Wrap a task's error with its description.
    pub fn new<E>(description: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            source: Box::new(source),
        }
    }
}

/// Outcome of one task: its value, or its captured failure.
pub type TaskResult<T> = Result<T, TaskError>;

/// Runner for independent units of work under a concurrency cap.
#[derive(Debug, Clone, Copy)]
pub struct ParallelExecutor {
    max_workers: usize,
}

impl Default for ParallelExecutor {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl ParallelExecutor {
    /// Create an executor with the given worker cap (minimum 1).
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// The maximum number of tasks executed concurrently.
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Run blocking tasks in parallel on scoped worker threads.
    ///
    /// `tasks` and `descriptions` are parallel sequences of equal length.
    /// Results come back in input order; a task's failure is captured in
    /// its slot and does not affect siblings. Empty input dispatches no
    /// work and returns an empty vector.
    pub fn run_sync<T, E, F>(&self, tasks: Vec<F>, descriptions: &[&str]) -> Vec<TaskResult<T>>
    where
        T: Send,
        E: std::error::Error + Send + Sync + 'static,
        F: FnOnce() -> Result<T, E> + Send,
    {
        assert_eq!(
            tasks.len(),
            descriptions.len(),
            "tasks and descriptions must have equal length"
        );

        let count = tasks.len();
        if count == 0 {
            return Vec::new();
        }

        let queue: Mutex<VecDeque<(usize, F)>> = Mutex::new(tasks.into_iter().enumerate().collect());
        let (tx, rx) = mpsc::channel::<(usize, TaskResult<T>)>();
        let workers = self.max_workers.min(count);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                scope.spawn(move || loop {
                    let job = queue.lock().pop_front();
                    let Some((idx, task)) = job else { break };

                    let result = task().map_err(|e| TaskError::new(descriptions[idx], e));
                    if tx.send((idx, result)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            // Each worker writes its own slot by index, so input order is
            // preserved no matter the completion order.
            let mut slots: Vec<Option<TaskResult<T>>> = (0..count).map(|_| None).collect();
            for (idx, result) in rx {
                slots[idx] = Some(result);
            }
            slots
                .into_iter()
                .map(|slot| slot.expect("every task sends exactly one result"))
                .collect()
        })
    }

    /// Run suspendable tasks in parallel under the same contract as
    /// [`run_sync`](Self::run_sync).
    ///
    /// Concurrency is capped with a semaphore; `join_all` preserves the
    /// input order of results.
    pub async fn run_async<T, E, Fut>(
        &self,
        tasks: Vec<Fut>,
        descriptions: &[&str],
    ) -> Vec<TaskResult<T>>
    where
        E: std::error::Error + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>>,
    {
        assert_eq!(
            tasks.len(),
            descriptions.len(),
            "tasks and descriptions must have equal length"
        );

        if tasks.is_empty() {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.max_workers));

        let futures = tasks.into_iter().enumerate().map(|(idx, task)| {
            let semaphore = Arc::clone(&semaphore);
            let description = descriptions[idx].to_string();
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("executor semaphore is never closed");
                task.await.map_err(|e| TaskError::new(description, e))
            }
        });

        join_all(futures).await
    }

    /// Extract successful values, preserving relative order.
    ///
    /// With `raise_on_error` set, the first captured failure in result
    /// order is returned as an error instead.
    pub fn filter_results<T>(
        &self,
        results: Vec<TaskResult<T>>,
        raise_on_error: bool,
    ) -> Result<Vec<T>, TaskError> {
        let mut values = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(value) => values.push(value),
                Err(e) if raise_on_error => return Err(e),
                Err(_) => {}
            }
        }
        Ok(values)
    }

    /// The captured failures only, in result order.
    pub fn get_errors<'a, T>(&self, results: &'a [TaskResult<T>]) -> Vec<&'a TaskError> {
        results.iter().filter_map(|r| r.as_ref().err()).collect()
    }

    /// Number of successful results.
    pub fn success_count<T>(&self, results: &[TaskResult<T>]) -> usize {
        results.iter().filter(|r| r.is_ok()).count()
    }

    /// Number of captured failures.
    pub fn failure_count<T>(&self, results: &[TaskResult<T>]) -> usize {
        results.iter().filter(|r| r.is_err()).count()
    }
}

/// Run described blocking tasks with the default executor.
pub fn run_parallel<T, E, F>(tasks: Vec<(F, &str)>) -> Vec<TaskResult<T>>
where
    T: Send,
    E: std::error::Error + Send + Sync + 'static,
    F: FnOnce() -> Result<T, E> + Send,
{
    let (tasks, descriptions): (Vec<F>, Vec<&str>) = tasks.into_iter().unzip();
    ParallelExecutor::default().run_sync(tasks, &descriptions)
}

/// Run described suspendable tasks with the default executor.
pub async fn run_parallel_async<T, E, Fut>(tasks: Vec<(Fut, &str)>) -> Vec<TaskResult<T>>
where
    E: std::error::Error + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>>,
{
    let (tasks, descriptions): (Vec<Fut>, Vec<&str>) = tasks.into_iter().unzip();
    ParallelExecutor::default().run_async(tasks, &descriptions).await
}
