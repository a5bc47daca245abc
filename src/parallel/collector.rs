//! Collector: merges every lane tail and feeds the recorder

use super::job::WorkItem;
use super::progress::RunProgress;
use super::queue::BlockingQueue;
use crate::reports::PerformanceRecorder;
use std::time::Instant;

/// What the Collector consumed before it stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorReport {
    pub jobs: usize,
    pub shutdowns: usize,
}

/// Sole consumer of the merged output queue
pub struct Collector {
    lanes: usize,
}

impl Collector {
    pub fn new(lanes: usize) -> Self {
        Self { lanes }
    }

    /// Pop until one shutdown per lane has been seen. Every job is stamped,
    /// handed to `recorder` and released.
    pub fn run<I>(
        &self,
        queue: &BlockingQueue<WorkItem<I>>,
        recorder: &mut PerformanceRecorder,
        progress: &RunProgress,
    ) -> CollectorReport {
        let mut report = CollectorReport::default();
        let mut remaining = self.lanes;

        while remaining > 0 {
            match queue.pop() {
                WorkItem::Shutdown => {
                    remaining -= 1;
                    report.shutdowns += 1;
                    tracing::debug!("Collector: lane drained, {} remaining", remaining);
                }
                WorkItem::Job(mut job) => {
                    let at = Instant::now();
                    job.complete(at);
                    tracing::trace!("Collector: job {} arrived", job.id());
                    recorder.record_job(job, at);
                    progress.job_done();
                    report.jobs += 1;
                }
            }
        }

        report
    }
}
