use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam::channel::{bounded, Receiver, Sender};
use log::{debug, warn};

use crate::archive::cancel::CancelToken;
use crate::archive::pipeline::ArchivePipeline;
use crate::archive::status::{StatusEvent, StatusSink};
use crate::cloud::ObjectStore;
use crate::constants::{JOB_THREAD_NAME, STATUS_CHANNEL_CAPACITY};
use crate::models::{ArchiveJob, JobOutcome};

/// Item produced by a [`JobHandle`].
#[derive(Debug, Clone)]
pub enum JobEvent {
    Status(StatusEvent),
    Finished(JobOutcome),
}

/// Forwards status events into a channel.
struct ChannelSink {
    sender: Sender<JobEvent>,
}

impl StatusSink for ChannelSink {
    fn emit(&self, event: StatusEvent) {
        // The consumer may have dropped its handle; the job still runs to completion.
        let _ = self.sender.send(JobEvent::Status(event));
    }
}

/// Handle to a job running on a background worker.
///
/// Iterating the handle yields every status event followed by exactly one
/// [`JobEvent::Finished`], then ends. The sequence cannot be restarted.
pub struct JobHandle {
    receiver: Receiver<JobEvent>,
    cancel: CancelToken,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

impl JobHandle {
    /// Ask the job to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Drain the remaining events and return the terminal outcome.
    pub fn wait(mut self) -> JobOutcome {
        let mut outcome = None;
        for event in self.by_ref() {
            if let JobEvent::Finished(result) = event {
                outcome = Some(result);
            }
        }
        outcome.unwrap_or_else(|| JobOutcome::failed("archive job already finished".to_string()))
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Archive worker panicked");
            }
        }
    }
}

impl Iterator for JobHandle {
    type Item = JobEvent;

    fn next(&mut self) -> Option<JobEvent> {
        if self.finished {
            return None;
        }

        match self.receiver.recv() {
            Ok(JobEvent::Finished(outcome)) => {
                self.finished = true;
                self.join_worker();
                Some(JobEvent::Finished(outcome))
            }
            Ok(event) => Some(event),
            Err(_) => {
                // Worker went away without reporting, which only happens on panic.
                self.finished = true;
                self.join_worker();
                Some(JobEvent::Finished(JobOutcome::failed(
                    "unexpected error: archive worker stopped".to_string(),
                )))
            }
        }
    }
}

/// Run `job` on a dedicated worker thread.
///
/// The pipeline is moved onto the worker together with a fresh cancel token
/// that the returned handle controls.
pub fn spawn<S>(pipeline: ArchivePipeline<S>, job: ArchiveJob) -> Result<JobHandle>
where
    S: ObjectStore + 'static,
{
    let cancel = CancelToken::new();
    let pipeline = pipeline.with_cancel_token(cancel.clone());
    let (sender, receiver) = bounded(STATUS_CHANNEL_CAPACITY);

    let worker = thread::Builder::new()
        .name(JOB_THREAD_NAME.to_string())
        .spawn(move || {
            let sink = ChannelSink { sender: sender.clone() };
            let outcome = pipeline.run(&job, &sink);
            debug!("Archive worker finished (success: {})", outcome.success);
            let _ = sender.send(JobEvent::Finished(outcome));
        })
        .context("Failed to start archive worker")?;

    Ok(JobHandle {
        receiver,
        cancel,
        worker: Some(worker),
        finished: false,
    })
}
