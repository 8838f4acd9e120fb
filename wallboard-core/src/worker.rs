//! Fetch workers.
//!
//! Network calls never run on the controller loop. Each kind of fetch
//! has a dedicated worker task fed over a bounded job channel; results
//! come back tagged with enough context (location index, source) for the
//! controller to drop stale completions, since completion order is not
//! request order.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::FetchError;
use crate::news::{NewsSource, NewsSourceId};
use crate::provider::{WeatherProvider, WeatherReport};

const JOB_QUEUE: usize = 8;

#[derive(Debug, Clone)]
pub struct WeatherJob {
    pub query: String,
    pub location_index: usize,
    pub first_run: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct NewsJob {
    pub source: NewsSourceId,
}

/// A completed fetch, tagged with the request context.
#[derive(Debug)]
pub enum FetchOutcome {
    Weather {
        location_index: usize,
        first_run: bool,
        result: Result<WeatherReport, FetchError>,
    },
    News {
        source: NewsSourceId,
        result: Result<String, FetchError>,
    },
}

/// Handle to a spawned worker. Dropping the sender stops the worker;
/// [`shutdown`](WorkerHandle::shutdown) additionally waits for it.
#[derive(Debug)]
pub struct WorkerHandle<J> {
    jobs: mpsc::Sender<J>,
    task: JoinHandle<()>,
}

impl<J> WorkerHandle<J> {
    /// Queue a job. A full queue or a stopped worker drops the job;
    /// the periodic timers will retry naturally.
    pub fn submit(&self, job: J) -> bool {
        match self.jobs.try_send(job) {
            Ok(()) => true,
            Err(e) => {
                debug!("job dropped: {e}");
                false
            }
        }
    }

    pub async fn shutdown(self) {
        drop(self.jobs);
        let _ = self.task.await;
    }
}

/// Spawn the weather worker. Jobs run one at a time in queue order.
pub fn spawn_weather(
    provider: Arc<dyn WeatherProvider>,
    outcomes: mpsc::Sender<FetchOutcome>,
) -> WorkerHandle<WeatherJob> {
    let (tx, mut rx) = mpsc::channel::<WeatherJob>(JOB_QUEUE);

    let task = tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            debug!(location = job.location_index, "weather fetch");
            let result = provider.fetch(&job.query).await;
            let outcome = FetchOutcome::Weather {
                location_index: job.location_index,
                first_run: job.first_run,
                result,
            };
            if outcomes.send(outcome).await.is_err() {
                break;
            }
        }
    });

    WorkerHandle { jobs: tx, task }
}

/// Spawn the news worker.
pub fn spawn_news(
    client: Arc<dyn NewsSource>,
    outcomes: mpsc::Sender<FetchOutcome>,
) -> WorkerHandle<NewsJob> {
    let (tx, mut rx) = mpsc::channel::<NewsJob>(JOB_QUEUE);

    let task = tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            debug!(source = %job.source, "news fetch");
            let result = client.fetch_titles(job.source).await;
            let outcome = FetchOutcome::News { source: job.source, result };
            if outcomes.send(outcome).await.is_err() {
                break;
            }
        }
    });

    WorkerHandle { jobs: tx, task }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StubProvider {
        fail: bool,
    }

    #[async_trait::async_trait]
    impl WeatherProvider for StubProvider {
        async fn fetch(&self, _query: &str) -> Result<WeatherReport, FetchError> {
            if self.fail {
                Err(FetchError::Timeout)
            } else {
                Err(FetchError::Network("stub".into()))
            }
        }
    }

    #[tokio::test]
    async fn outcomes_carry_request_context() {
        let (tx, mut rx) = mpsc::channel(4);
        let worker = spawn_weather(Arc::new(StubProvider { fail: true }), tx);

        assert!(worker.submit(WeatherJob {
            query: "lat=1&lon=2".into(),
            location_index: 3,
            first_run: true,
        }));

        match rx.recv().await.expect("outcome") {
            FetchOutcome::Weather { location_index, first_run, result } => {
                assert_eq!(location_index, 3);
                assert!(first_run);
                assert!(matches!(result, Err(FetchError::Timeout)));
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        worker.shutdown().await;
    }

    #[tokio::test]
    async fn jobs_run_in_queue_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let worker = spawn_weather(Arc::new(StubProvider { fail: false }), tx);

        for i in 0..3 {
            worker.submit(WeatherJob {
                query: String::new(),
                location_index: i,
                first_run: false,
            });
        }

        for expect in 0..3 {
            match rx.recv().await.expect("outcome") {
                FetchOutcome::Weather { location_index, .. } => {
                    assert_eq!(location_index, expect);
                }
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        worker.shutdown().await;
    }
}
