use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Instant;

use crashlens_application::ApplicationError;
use tracing::{debug, warn};

struct ScheduledJob<J> {
    sequence: u64,
    job: J,
}

/// Output of one job together with the sequence `submit` returned for it.
#[derive(Debug)]
pub struct JobResult<R> {
    pub sequence: u64,
    pub elapsed_ms: u64,
    pub output: R,
}

/// A named background thread running one kind of job in submission order.
/// Results are collected with [`JobWorker::try_receive`] from the UI loop.
pub struct JobWorker<J, R> {
    name: &'static str,
    next_sequence: AtomicU64,
    completed: Arc<AtomicU64>,
    submit_tx: mpsc::Sender<ScheduledJob<J>>,
    result_rx: Mutex<mpsc::Receiver<JobResult<R>>>,
}

impl<J, R> JobWorker<J, R>
where
    J: Send + 'static,
    R: Send + 'static,
{
    pub fn spawn<F>(name: &'static str, handler: F) -> Result<Self, ApplicationError>
    where
        F: Fn(J) -> R + Send + 'static,
    {
        let (submit_tx, submit_rx) = mpsc::channel::<ScheduledJob<J>>();
        let (result_tx, result_rx) = mpsc::channel::<JobResult<R>>();
        let completed = Arc::new(AtomicU64::new(0));

        spawn_worker(name, submit_rx, result_tx, Arc::clone(&completed), handler)?;

        Ok(Self {
            name,
            next_sequence: AtomicU64::new(0),
            completed,
            submit_tx,
            result_rx: Mutex::new(result_rx),
        })
    }

    pub fn submit(&self, job: J) -> Result<u64, ApplicationError> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.submit_tx
            .send(ScheduledJob { sequence, job })
            .map_err(|_| ApplicationError::Io(format!("{} worker is gone", self.name)))?;
        debug!(worker = self.name, sequence, "job submitted");
        Ok(sequence)
    }

    /// Next finished job, if any. Never blocks.
    pub fn try_receive(&self) -> Result<Option<JobResult<R>>, ApplicationError> {
        let receiver = self
            .result_rx
            .lock()
            .map_err(|_| ApplicationError::Io(format!("{} result lock poisoned", self.name)))?;

        match receiver.try_recv() {
            Ok(result) => Ok(Some(result)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(ApplicationError::Io(format!(
                "{} result channel disconnected",
                self.name
            ))),
        }
    }

    pub fn pending(&self) -> u64 {
        self.next_sequence
            .load(Ordering::SeqCst)
            .saturating_sub(self.completed.load(Ordering::SeqCst))
    }
}

fn spawn_worker<J, R, F>(
    name: &'static str,
    submit_rx: mpsc::Receiver<ScheduledJob<J>>,
    result_tx: mpsc::Sender<JobResult<R>>,
    completed: Arc<AtomicU64>,
    handler: F,
) -> Result<(), ApplicationError>
where
    J: Send + 'static,
    R: Send + 'static,
    F: Fn(J) -> R + Send + 'static,
{
    thread::Builder::new()
        .name(format!("crashlens-{name}"))
        .spawn(move || {
            while let Ok(scheduled) = submit_rx.recv() {
                let started = Instant::now();
                let output = handler(scheduled.job);
                let elapsed_ms = started.elapsed().as_millis() as u64;
                completed.fetch_add(1, Ordering::SeqCst);
                debug!(worker = name, sequence = scheduled.sequence, elapsed_ms, "job finished");

                let result = JobResult {
                    sequence: scheduled.sequence,
                    elapsed_ms,
                    output,
                };
                if result_tx.send(result).is_err() {
                    warn!(worker = name, "result receiver dropped, stopping worker");
                    return;
                }
            }
        })
        .map(|_| ())
        .map_err(|error| ApplicationError::Io(format!("failed to spawn {name} worker: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait_for<R>(worker: &JobWorker<u32, R>) -> JobResult<R>
    where
        R: Send + 'static,
    {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(result) = worker.try_receive().expect("poll") {
                return result;
            }
            assert!(Instant::now() < deadline, "timed out waiting for job");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn every_job_is_answered_in_order() {
        let worker = JobWorker::spawn("double", |value: u32| value * 2).expect("spawn");
        let sequences: Vec<_> = (1..=4)
            .map(|value| worker.submit(value).expect("submit"))
            .collect();
        assert_eq!(sequences, vec![1, 2, 3, 4]);

        let results: Vec<_> = (0..4).map(|_| wait_for(&worker)).collect();
        assert_eq!(
            results.iter().map(|r| (r.sequence, r.output)).collect::<Vec<_>>(),
            vec![(1, 2), (2, 4), (3, 6), (4, 8)]
        );
        assert_eq!(worker.pending(), 0);
    }

    #[test]
    fn empty_queue_polls_none() {
        let worker = JobWorker::spawn("noop", |value: u32| value).expect("spawn");
        assert!(worker.try_receive().expect("poll").is_none());
    }

    #[test]
    fn slow_job_does_not_block_the_caller() {
        let worker = JobWorker::spawn("slow", |value: u32| {
            thread::sleep(Duration::from_millis(50));
            value
        })
        .expect("spawn");
        let started = Instant::now();
        worker.submit(1).expect("submit");
        assert!(worker.try_receive().expect("poll").is_none());
        assert!(started.elapsed() < Duration::from_millis(50));
        assert_eq!(wait_for(&worker).output, 1);
    }
}
