//! Work items flowing through the lanes

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// What a stage does to a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Load, mark and store in one step
    Compose,
    Load,
    Mark,
    Store,
}

impl StageKind {
    pub fn label(&self) -> &'static str {
        match self {
            StageKind::Compose => "compose",
            StageKind::Load => "load",
            StageKind::Mark => "mark",
            StageKind::Store => "store",
        }
    }
}

/// A timed interval in the life of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Emitter push until the first stage pops the job
    Dispatch,
    /// Processing inside a stage
    Stage(StageKind),
    /// Stage push until the next consumer pops the job
    Handoff(StageKind),
    /// Emitter dispatch until the Collector receives the job
    EndToEnd,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Dispatch => write!(f, "Tcom emit."),
            Phase::Stage(kind) => write!(f, "L {}", kind.label()),
            Phase::Handoff(kind) => write!(f, "Tcom {}", kind.label()),
            Phase::EndToEnd => write!(f, "L"),
        }
    }
}

/// Ordered (start, end) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    start: Instant,
    end: Instant,
}

impl Span {
    /// An `end` earlier than `start` collapses to an empty span
    pub fn new(start: Instant, end: Instant) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn end(&self) -> Instant {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn millis(&self) -> f64 {
        self.duration().as_secs_f64() * 1000.0
    }
}

/// Per-phase spans of one job; each phase is written at most once
#[derive(Debug, Clone, Default)]
pub struct Timings {
    spans: BTreeMap<Phase, Span>,
}

impl Timings {
    /// Record `span` for `phase`. A phase that already has a span keeps it
    /// and `false` is returned.
    pub fn record(&mut self, phase: Phase, span: Span) -> bool {
        let fresh = !self.spans.contains_key(&phase);
        debug_assert!(fresh, "phase {phase:?} recorded twice");
        if fresh {
            self.spans.insert(phase, span);
        }
        fresh
    }

    pub fn get(&self, phase: Phase) -> Option<&Span> {
        self.spans.get(&phase)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Phase, &Span)> {
        self.spans.iter().map(|(phase, span)| (*phase, span))
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// One input image travelling from the Emitter to the Collector.
///
/// A job is owned by exactly one thread at a time; it moves between
/// threads only by being pushed into a [`BlockingQueue`](super::BlockingQueue).
#[derive(Debug)]
pub struct Job<I> {
    id: usize,
    source: PathBuf,
    image: Option<I>,
    timings: Timings,
    dispatched_at: Option<Instant>,
    in_flight: Option<(Phase, Instant)>,
}

impl<I> Job<I> {
    pub fn new(id: usize, source: PathBuf) -> Self {
        Self {
            id,
            source,
            image: None,
            timings: Timings::default(),
            dispatched_at: None,
            in_flight: None,
        }
    }

    /// Position of the input in enumeration order
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn image(&self) -> Option<&I> {
        self.image.as_ref()
    }

    pub fn image_mut(&mut self) -> Option<&mut I> {
        self.image.as_mut()
    }

    pub fn set_image(&mut self, image: I) {
        self.image = Some(image);
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn dispatched_at(&self) -> Option<Instant> {
        self.dispatched_at
    }

    /// Stamp the dispatch start; the Dispatch phase closes on the next `arrive`
    pub fn dispatch(&mut self, at: Instant) {
        self.dispatched_at = Some(at);
        self.depart(Phase::Dispatch, at);
    }

    /// Open a queue-wait phase right before the job is pushed
    pub fn depart(&mut self, phase: Phase, at: Instant) {
        debug_assert!(self.in_flight.is_none(), "job {} departed twice", self.id);
        self.in_flight = Some((phase, at));
    }

    /// Close the open queue-wait phase, if any, right after the job is popped
    pub fn arrive(&mut self, at: Instant) {
        if let Some((phase, start)) = self.in_flight.take() {
            self.timings.record(phase, Span::new(start, at));
        }
    }

    /// Record a processing phase
    pub fn record(&mut self, phase: Phase, start: Instant, end: Instant) {
        self.timings.record(phase, Span::new(start, end));
    }

    /// Stamp the terminal timestamp at the Collector
    pub fn complete(&mut self, at: Instant) {
        self.arrive(at);
        if let Some(start) = self.dispatched_at {
            self.timings.record(Phase::EndToEnd, Span::new(start, at));
        }
    }

    /// Release the image and keep what the recorder needs
    pub fn into_parts(self) -> (usize, PathBuf, Timings) {
        (self.id, self.source, self.timings)
    }
}

/// What travels on every queue: a job, or the end of a lane
#[derive(Debug)]
pub enum WorkItem<I> {
    Job(Job<I>),
    /// No more work on this lane
    Shutdown,
}

impl<I> WorkItem<I> {
    pub fn is_shutdown(&self) -> bool {
        matches!(self, WorkItem::Shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_is_ordered() {
        let start = Instant::now();
        let end = start + Duration::from_millis(5);
        let reversed = Span::new(end, start);
        assert_eq!(reversed.start(), end);
        assert_eq!(reversed.duration(), Duration::ZERO);
        assert!(Span::new(start, end).millis() >= 5.0);
    }

    #[test]
    fn test_dispatch_then_arrive_records_dispatch() {
        let mut job: Job<()> = Job::new(0, PathBuf::from("a.png"));
        let t0 = Instant::now();
        job.dispatch(t0);
        job.arrive(t0 + Duration::from_millis(2));

        let span = job.timings().get(Phase::Dispatch).unwrap();
        assert_eq!(span.start(), t0);
        assert!(span.start() <= span.end());
        assert!(job.timings().get(Phase::EndToEnd).is_none());
    }

    #[test]
    fn test_complete_records_end_to_end_and_open_handoff() {
        let mut job: Job<()> = Job::new(3, PathBuf::from("b.png"));
        let t0 = Instant::now();
        job.dispatch(t0);
        job.arrive(t0);
        job.record(Phase::Stage(StageKind::Compose), t0, t0 + Duration::from_millis(1));
        job.depart(Phase::Handoff(StageKind::Compose), t0 + Duration::from_millis(1));
        job.complete(t0 + Duration::from_millis(3));

        let phases: Vec<_> = job.timings().iter().map(|(p, _)| p).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Dispatch,
                Phase::Stage(StageKind::Compose),
                Phase::Handoff(StageKind::Compose),
                Phase::EndToEnd,
            ]
        );
        for (_, span) in job.timings().iter() {
            assert!(span.start() <= span.end());
        }
    }

    #[test]
    fn test_arrive_without_departure_is_noop() {
        let mut job: Job<()> = Job::new(0, PathBuf::from("c.png"));
        job.arrive(Instant::now());
        assert!(job.timings().is_empty());
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_phase_written_once() {
        let mut timings = Timings::default();
        let t0 = Instant::now();
        assert!(timings.record(Phase::Dispatch, Span::new(t0, t0)));
        assert!(!timings.record(Phase::Dispatch, Span::new(t0, t0 + Duration::from_millis(9))));
        assert_eq!(timings.get(Phase::Dispatch).unwrap().duration(), Duration::ZERO);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "recorded twice")]
    fn test_phase_written_twice_asserts() {
        let mut timings = Timings::default();
        let t0 = Instant::now();
        timings.record(Phase::Dispatch, Span::new(t0, t0));
        timings.record(Phase::Dispatch, Span::new(t0, t0));
    }

    #[test]
    fn test_work_item_shutdown() {
        let item: WorkItem<()> = WorkItem::Shutdown;
        assert!(item.is_shutdown());
        let job: WorkItem<()> = WorkItem::Job(Job::new(0, PathBuf::from("d.png")));
        assert!(!job.is_shutdown());
    }
}
