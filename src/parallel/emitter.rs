//! Emitter: enumerates inputs and deals jobs to the lanes

use super::job::{Job, Span, WorkItem};
use super::progress::RunProgress;
use super::queue::BlockingQueue;
use super::stats::RunStats;
use crate::codec::Codec;
use crate::error::MarkError;
use crate::shared::InputSource;
use std::time::{Duration, Instant};

/// Cyclic lane selector starting at lane 0
#[derive(Debug, Clone)]
pub struct RoundRobin {
    lanes: usize,
    next: usize,
}

impl RoundRobin {
    pub fn new(lanes: usize) -> Self {
        Self {
            lanes: lanes.max(1),
            next: 0,
        }
    }

    pub fn next_lane(&mut self) -> usize {
        let lane = self.next;
        self.next = (self.next + 1) % self.lanes;
        lane
    }
}

/// What the Emitter did before shutting the lanes down
#[derive(Debug, Clone)]
pub struct EmitReport {
    /// Directory listing plus optional pre-load
    pub enumeration: Span,
    pub enumerated: usize,
    pub dispatched: usize,
}

/// Produces one job per input path and deals them round robin to the head
/// queue of each lane. Always finishes by sending one shutdown per lane.
pub struct Emitter<'a, C: Codec> {
    lanes: Vec<&'a BlockingQueue<WorkItem<C::Image>>>,
    delay: Duration,
    /// Decode every input before the first dispatch
    preload: Option<&'a C>,
    stats: &'a RunStats,
    progress: &'a RunProgress,
}

impl<'a, C: Codec> Emitter<'a, C> {
    pub fn new(
        lanes: Vec<&'a BlockingQueue<WorkItem<C::Image>>>,
        delay: Duration,
        stats: &'a RunStats,
        progress: &'a RunProgress,
    ) -> Result<Self, MarkError> {
        if lanes.is_empty() {
            return Err(MarkError::configuration("an emitter needs at least one lane"));
        }
        Ok(Self {
            lanes,
            delay,
            preload: None,
            stats,
            progress,
        })
    }

    pub fn with_preload(mut self, codec: &'a C) -> Self {
        self.preload = Some(codec);
        self
    }

    /// Enumerate `source`, dispatch every job, then shut every lane down.
    ///
    /// An enumeration failure is returned only after the shutdowns went out,
    /// so the lanes and the Collector still drain.
    pub fn run(&self, source: &dyn InputSource) -> Result<EmitReport, MarkError> {
        tracing::debug!("Emitter starts with {} lanes", self.lanes.len());
        let outcome = self.dispatch_all(source);
        if let Err(e) = &outcome {
            tracing::error!("{}", e);
        }
        self.broadcast_shutdown();
        tracing::debug!("Emitter ends");
        outcome
    }

    fn dispatch_all(&self, source: &dyn InputSource) -> Result<EmitReport, MarkError> {
        let start = Instant::now();
        let paths = source.list()?;
        let enumerated = paths.len();
        self.stats.set_enumerated(enumerated);
        self.progress.set_total(enumerated);

        let mut jobs: Vec<Job<C::Image>> = paths
            .into_iter()
            .enumerate()
            .map(|(id, path)| Job::new(id, path))
            .collect();
        if let Some(codec) = self.preload {
            jobs = self.preload_all(codec, jobs);
        }
        let enumeration = Span::new(start, Instant::now());

        let mut round_robin = RoundRobin::new(self.lanes.len());
        let mut dispatched = 0;
        for mut job in jobs {
            if dispatched > 0 && !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }

            let lane = round_robin.next_lane();
            tracing::trace!("Dispatching {} to lane {}", job.source().display(), lane);
            job.dispatch(Instant::now());
            self.stats.increment_dispatched(lane);
            self.lanes[lane].push(WorkItem::Job(job));
            dispatched += 1;
        }

        Ok(EmitReport {
            enumeration,
            enumerated,
            dispatched,
        })
    }

    fn preload_all(&self, codec: &C, jobs: Vec<Job<C::Image>>) -> Vec<Job<C::Image>> {
        jobs.into_iter()
            .filter_map(|mut job| match codec.decode(job.source()) {
                Ok(image) => {
                    job.set_image(image);
                    Some(job)
                }
                Err(e) => {
                    tracing::debug!("Dropping job {}: {}", job.id(), e);
                    self.stats.increment_dropped();
                    self.progress.job_dropped();
                    None
                }
            })
            .collect()
    }

    fn broadcast_shutdown(&self) {
        for lane in &self.lanes {
            lane.push(WorkItem::Shutdown);
        }
    }
}
