//! Lane stage workers

use super::job::{Job, Phase, StageKind, WorkItem};
use super::progress::RunProgress;
use super::queue::BlockingQueue;
use super::stats::RunStats;
use crate::codec::Codec;
use crate::error::MarkError;
use crate::shared::output_path;
use std::time::Instant;

/// Jobs a lane stage handled before it saw its shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneReport {
    pub forwarded: usize,
    pub dropped: usize,
}

/// One stage instance of one lane.
///
/// The loop is pop → shutdown? forward it and exit : process and forward.
pub struct StageWorker<'a, C: Codec> {
    lane: usize,
    kind: StageKind,
    codec: &'a C,
    prefix: &'a str,
    stats: &'a RunStats,
    progress: &'a RunProgress,
}

impl<'a, C: Codec> StageWorker<'a, C> {
    pub fn new(
        lane: usize,
        kind: StageKind,
        codec: &'a C,
        prefix: &'a str,
        stats: &'a RunStats,
        progress: &'a RunProgress,
    ) -> Self {
        Self {
            lane,
            kind,
            codec,
            prefix,
            stats,
            progress,
        }
    }

    pub fn run(
        &self,
        input: &BlockingQueue<WorkItem<C::Image>>,
        output: &BlockingQueue<WorkItem<C::Image>>,
    ) -> LaneReport {
        tracing::debug!("Lane {} {} stage starts", self.lane, self.kind.label());
        let mut report = LaneReport::default();

        loop {
            let mut job = match input.pop() {
                WorkItem::Shutdown => break,
                WorkItem::Job(job) => job,
            };
            job.arrive(Instant::now());

            if self.handle(&mut job) {
                job.depart(Phase::Handoff(self.kind), Instant::now());
                output.push(WorkItem::Job(job));
                report.forwarded += 1;
            } else {
                report.dropped += 1;
            }
        }

        output.push(WorkItem::Shutdown);
        tracing::debug!(
            "Lane {} {} stage ends ({} forwarded, {} dropped)",
            self.lane,
            self.kind.label(),
            report.forwarded,
            report.dropped
        );
        report
    }

    /// Process and time one job. Returns false when the job has to be
    /// dropped.
    pub fn handle(&self, job: &mut Job<C::Image>) -> bool {
        let start = Instant::now();
        let outcome = self.process(job);
        job.record(Phase::Stage(self.kind), start, Instant::now());

        match outcome {
            Ok(()) => true,
            Err(e) => {
                if e.is_per_job() {
                    tracing::debug!(
                        "Lane {} {}: dropping job {}: {}",
                        self.lane,
                        self.kind.label(),
                        job.id(),
                        e
                    );
                } else {
                    tracing::warn!("Lane {}: dropping job {}: {}", self.lane, job.id(), e);
                }
                self.stats.increment_dropped();
                self.progress.job_dropped();
                false
            }
        }
    }

    fn process(&self, job: &mut Job<C::Image>) -> Result<(), MarkError> {
        match self.kind {
            StageKind::Compose => {
                self.load(job)?;
                self.mark(job)?;
                self.store(job)
            }
            StageKind::Load => self.load(job),
            StageKind::Mark => self.mark(job),
            StageKind::Store => self.store(job),
        }
    }

    fn load(&self, job: &mut Job<C::Image>) -> Result<(), MarkError> {
        let image = self.codec.decode(job.source())?;
        job.set_image(image);
        Ok(())
    }

    fn mark(&self, job: &mut Job<C::Image>) -> Result<(), MarkError> {
        let source = job.source().to_path_buf();
        let image = job.image_mut().ok_or_else(|| missing_image(&source))?;
        self.codec.apply_mark(image, &source)
    }

    fn store(&self, job: &mut Job<C::Image>) -> Result<(), MarkError> {
        let target = output_path(job.source(), self.prefix);
        let image = job.image().ok_or_else(|| missing_image(job.source()))?;
        self.codec.encode(image, &target)
    }
}

fn missing_image(source: &std::path::Path) -> MarkError {
    MarkError::Mark {
        path: source.to_path_buf(),
        reason: "no decoded image on the job".to_string(),
    }
}
