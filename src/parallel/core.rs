use super::collector::{Collector, CollectorReport};
use super::emitter::{EmitReport, Emitter};
use super::job::{Job, Phase, StageKind, WorkItem};
use super::progress::RunProgress;
use super::queue::BlockingQueue;
use super::stage::{LaneReport, StageWorker};
use super::stats::{RunStats, RunTotals};
use crate::codec::Codec;
use crate::error::MarkError;
use crate::reports::{PerformanceRecorder, RunPhase};
use crate::shared::{DEFAULT_OUTPUT_PREFIX, InputSource};
use std::io;
use std::time::{Duration, Instant};

/// Per-run knobs shared by every strategy
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pause between two dispatches
    pub delay: Duration,
    /// Inserted before the file name of every output
    pub prefix: String,
    pub progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            progress: false,
        }
    }
}

/// Execution strategy: how the work of a run is laid out on threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// One thread, no queues
    Sequential,
    /// `lanes` workers each doing load, mark and store
    Farm { lanes: usize },
    /// `lanes` chains of stages; with `preload` the Emitter decodes and
    /// each lane runs Mark → Store, otherwise Load → Mark → Store
    Pipeline { lanes: usize, preload: bool },
}

impl ExecutionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ExecutionStrategy::Sequential => "sequential",
            ExecutionStrategy::Farm { .. } => "farm",
            ExecutionStrategy::Pipeline { .. } => "pipeline",
        }
    }

    pub fn lanes(&self) -> usize {
        match self {
            ExecutionStrategy::Sequential => 1,
            ExecutionStrategy::Farm { lanes } | ExecutionStrategy::Pipeline { lanes, .. } => *lanes,
        }
    }

    /// Stages of one lane, head first
    pub fn stage_kinds(&self) -> Vec<StageKind> {
        match self {
            ExecutionStrategy::Sequential | ExecutionStrategy::Farm { .. } => {
                vec![StageKind::Compose]
            }
            ExecutionStrategy::Pipeline { preload: true, .. } => {
                vec![StageKind::Mark, StageKind::Store]
            }
            ExecutionStrategy::Pipeline { preload: false, .. } => {
                vec![StageKind::Load, StageKind::Mark, StageKind::Store]
            }
        }
    }

    /// Per-job phases worth reporting for this layout, in flow order
    pub fn phases(&self) -> Vec<Phase> {
        if let ExecutionStrategy::Sequential = self {
            return vec![Phase::Stage(StageKind::Compose)];
        }

        let mut phases = vec![Phase::Dispatch];
        for kind in self.stage_kinds() {
            phases.push(Phase::Stage(kind));
            phases.push(Phase::Handoff(kind));
        }
        phases
    }

    fn preload(&self) -> bool {
        matches!(self, ExecutionStrategy::Pipeline { preload: true, .. })
    }

    /// Run every input of `source` through `codec`, feeding `recorder`.
    ///
    /// Per-job failures only show up in the returned totals. An
    /// enumeration failure is returned once every thread has joined.
    pub fn execute<C: Codec>(
        &self,
        source: &dyn InputSource,
        codec: &C,
        recorder: &mut PerformanceRecorder,
        options: &RunOptions,
    ) -> Result<RunTotals, MarkError> {
        tracing::info!(
            "Starting {} run with {} lane(s)",
            self.name(),
            self.lanes()
        );
        match self {
            ExecutionStrategy::Sequential => {
                SequentialExecutor::execute(source, codec, recorder, options)
            }
            _ => ParallelExecutor::new(self).execute(source, codec, recorder, options),
        }
    }
}

/// Emitter, `lanes` stage chains and a Collector on scoped threads
pub struct ParallelExecutor {
    lanes: usize,
    stages: Vec<StageKind>,
    preload: bool,
    /// Threads the executor may start before spawning is refused
    thread_budget: Option<usize>,
}

type Chains<I> = Vec<Vec<BlockingQueue<WorkItem<I>>>>;

impl ParallelExecutor {
    pub fn new(strategy: &ExecutionStrategy) -> Self {
        Self {
            lanes: strategy.lanes().max(1),
            stages: strategy.stage_kinds(),
            preload: strategy.preload(),
            thread_budget: None,
        }
    }

    /// Refuse every spawn past the first `budget` threads
    #[cfg(test)]
    pub(crate) fn with_thread_budget(mut self, budget: usize) -> Self {
        self.thread_budget = Some(budget);
        self
    }

    fn admit(&self, spawned: usize, name: &str) -> io::Result<()> {
        match self.thread_budget {
            Some(budget) if spawned >= budget => Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                format!("thread budget of {budget} exhausted before {name}"),
            )),
            _ => Ok(()),
        }
    }

    pub fn execute<C: Codec>(
        &self,
        source: &dyn InputSource,
        codec: &C,
        recorder: &mut PerformanceRecorder,
        options: &RunOptions,
    ) -> Result<RunTotals, MarkError> {
        let setup_start = Instant::now();
        let progress = RunProgress::new(options.progress);
        let stats = RunStats::new(self.lanes);
        if let Some(expected) = source.len_hint() {
            recorder.reserve(expected);
        }

        // chains[lane][k] feeds stage k of that lane; the last stage of
        // every lane pushes to the shared collector queue
        let chains: Chains<C::Image> = (0..self.lanes)
            .map(|_| self.stages.iter().map(|_| BlockingQueue::new()).collect())
            .collect();
        let collector_queue: BlockingQueue<WorkItem<C::Image>> = BlockingQueue::new();

        let heads = chains.iter().filter_map(|chain| chain.first()).collect();
        let mut emitter = Emitter::<C>::new(heads, options.delay, &stats, &progress)?;
        if self.preload {
            emitter = emitter.with_preload(codec);
        }
        let collector = Collector::new(self.lanes);

        let chains_ref = &chains;
        let collector_queue = &collector_queue;
        let progress_ref = &progress;
        let stats_ref = &stats;
        let sink = &mut *recorder;

        let completion_start = Instant::now();
        let joined = crossbeam::thread::scope(|s| -> Result<_, MarkError> {
            let mut lane_handles = Vec::with_capacity(self.lanes * self.stages.len());
            for (lane, chain) in chains_ref.iter().enumerate() {
                for (k, kind) in self.stages.iter().enumerate() {
                    let input = &chain[k];
                    let output = chain.get(k + 1).unwrap_or(collector_queue);
                    let worker = StageWorker::new(
                        lane,
                        *kind,
                        codec,
                        &options.prefix,
                        stats_ref,
                        progress_ref,
                    );
                    let name = format!("lane-{lane}-{}", kind.label());
                    let handle = self
                        .admit(lane_handles.len(), &name)
                        .and_then(|()| {
                            s.builder()
                                .name(name)
                                .spawn(move |_| worker.run(input, output))
                        })
                        .map_err(|e| abort_lanes(chains_ref, e))?;
                    lane_handles.push(handle);
                }
            }
            let spawned = lane_handles.len();
            let collector_handle = self
                .admit(spawned, "collector")
                .and_then(|()| {
                    s.builder()
                        .name("collector".to_string())
                        .spawn(move |_| collector.run(collector_queue, sink, progress_ref))
                })
                .map_err(|e| abort_lanes(chains_ref, e))?;
            let emitter_handle = self
                .admit(spawned + 1, "emitter")
                .and_then(|()| {
                    s.builder()
                        .name("emitter".to_string())
                        .spawn(move |_| emitter.run(source))
                })
                .map_err(|e| abort_lanes(chains_ref, e))?;
            let setup_end = Instant::now();

            let emitted = emitter_handle.join();
            let lanes: Vec<_> = lane_handles.into_iter().map(|h| h.join()).collect();
            let collected = collector_handle.join();
            Ok((setup_end, emitted, lanes, collected))
        });
        let completion_end = Instant::now();
        progress.finish();

        let (setup_end, emitted, lanes, collected) =
            joined.map_err(|_| MarkError::Worker("a thread panicked".to_string()))??;
        let emitted: Result<EmitReport, MarkError> =
            emitted.map_err(|_| MarkError::Worker("emitter panicked".to_string()))?;
        let lanes: Vec<LaneReport> = lanes
            .into_iter()
            .collect::<Result<_, _>>()
            .map_err(|_| MarkError::Worker("stage worker panicked".to_string()))?;
        let collected: CollectorReport =
            collected.map_err(|_| MarkError::Worker("collector panicked".to_string()))?;

        recorder.record_phase(RunPhase::Setup, setup_start, setup_end);
        recorder.record_phase(RunPhase::Completion, completion_start, completion_end);

        if cfg!(debug_assertions) {
            check_protocol(collector_queue, &chains);
        }

        let totals = stats.snapshot();
        let lane_drops: usize = lanes.iter().map(|l| l.dropped).sum();
        tracing::info!(
            "Run finished: {} processed, {} dropped in lanes, {} dropped in total",
            collected.jobs,
            lane_drops,
            totals.dropped
        );

        let emitted = emitted?;
        recorder.record_span(RunPhase::Enumeration, emitted.enumeration);
        debug_assert_eq!(collected.jobs + totals.dropped, emitted.enumerated);
        Ok(totals)
    }
}

/// Shut down every lane head after a refused spawn so the threads already
/// running drain and the scope can join them.
fn abort_lanes<I>(chains: &[Vec<BlockingQueue<WorkItem<I>>>], err: io::Error) -> MarkError {
    tracing::error!("Cannot start worker thread: {}", err);
    for head in chains.iter().filter_map(|chain| chain.first()) {
        head.push(WorkItem::Shutdown);
    }
    MarkError::Worker(format!("cannot start worker thread: {err}"))
}

/// Post-join shutdown protocol check. The Collector stops at its N-th
/// shutdown, so a lane that forwarded more than one leaves items behind.
pub(crate) fn check_protocol<I>(
    collector_queue: &BlockingQueue<WorkItem<I>>,
    chains: &[Vec<BlockingQueue<WorkItem<I>>>],
) {
    assert!(
        collector_queue.is_empty(),
        "items left after the last shutdown: {}",
        collector_queue.len()
    );
    assert!(
        chains.iter().flatten().all(BlockingQueue::is_empty),
        "items left in a lane queue"
    );
}

/// The whole run on the calling thread, timed the same way
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn execute<C: Codec>(
        source: &dyn InputSource,
        codec: &C,
        recorder: &mut PerformanceRecorder,
        options: &RunOptions,
    ) -> Result<RunTotals, MarkError> {
        let progress = RunProgress::new(options.progress);
        let stats = RunStats::new(1);
        let worker = StageWorker::new(
            0,
            StageKind::Compose,
            codec,
            &options.prefix,
            &stats,
            &progress,
        );

        let start = Instant::now();
        let paths = source.list()?;
        stats.set_enumerated(paths.len());
        progress.set_total(paths.len());
        recorder.reserve(paths.len());
        recorder.record_phase(RunPhase::Enumeration, start, Instant::now());

        for (id, path) in paths.into_iter().enumerate() {
            if id > 0 && !options.delay.is_zero() {
                std::thread::sleep(options.delay);
            }

            let mut job: Job<C::Image> = Job::new(id, path);
            let dispatched = Instant::now();
            job.dispatch(dispatched);
            job.arrive(dispatched);
            stats.increment_dispatched(0);

            if worker.handle(&mut job) {
                let at = Instant::now();
                job.complete(at);
                recorder.record_job(job, at);
                progress.job_done();
            }
        }

        recorder.record_phase(RunPhase::Completion, start, Instant::now());
        progress.finish();

        let totals = stats.snapshot();
        tracing::info!(
            "Run finished: {} processed, {} dropped",
            recorder.len(),
            totals.dropped
        );
        Ok(totals)
    }
}
