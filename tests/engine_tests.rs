//! Engine tests through the public library API

use image::{Rgb, RgbImage};
use markfarm::codec::{Codec, ImageCodec, MarkRegion};
use markfarm::error::MarkError;
use markfarm::parallel::{
    BlockingQueue, Collector, Emitter, ExecutionStrategy, Phase, RunOptions, RunProgress,
    RunStats, StageKind, StageWorker, WorkItem,
};
use markfarm::reports::{PerformanceRecorder, ReportGenerator, RunReport, TextReportGenerator};
use markfarm::shared::DirectoryInput;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Counts calls; never touches the disk
#[derive(Default)]
struct CountingCodec {
    decoded: AtomicUsize,
    marked: AtomicUsize,
    encoded: AtomicUsize,
}

impl Codec for CountingCodec {
    type Image = Vec<u8>;

    fn decode(&self, path: &Path) -> Result<Vec<u8>, MarkError> {
        self.decoded.fetch_add(1, Ordering::SeqCst);
        Ok(path.to_string_lossy().into_owned().into_bytes())
    }

    fn apply_mark(&self, image: &mut Vec<u8>, _path: &Path) -> Result<(), MarkError> {
        self.marked.fetch_add(1, Ordering::SeqCst);
        image.reverse();
        Ok(())
    }

    fn encode(&self, _image: &Vec<u8>, _path: &Path) -> Result<(), MarkError> {
        self.encoded.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn paths(count: usize) -> Vec<PathBuf> {
    (0..count).map(|i| PathBuf::from(format!("img{i}.png"))).collect()
}

/// Emitter, two single-stage lanes and a Collector wired by hand
#[test]
fn test_hand_wired_farm_counts_one_shutdown_per_lane() {
    let codec = CountingCodec::default();
    let stats = RunStats::new(2);
    let progress = RunProgress::hidden();
    let lanes: Vec<BlockingQueue<WorkItem<Vec<u8>>>> =
        (0..2).map(|_| BlockingQueue::new()).collect();
    let merged = BlockingQueue::new();
    let mut recorder = PerformanceRecorder::new(ExecutionStrategy::Farm { lanes: 2 }.phases());

    let inputs = paths(3);
    let (emitted, collected) = crossbeam::thread::scope(|s| {
        for (lane, queue) in lanes.iter().enumerate() {
            let worker =
                StageWorker::new(lane, StageKind::Compose, &codec, "out_", &stats, &progress);
            let merged = &merged;
            s.spawn(move |_| worker.run(queue, merged));
        }
        let recorder = &mut recorder;
        let merged = &merged;
        let progress = &progress;
        let collector = s.spawn(move |_| Collector::new(2).run(merged, recorder, progress));

        let emitter: Emitter<CountingCodec> =
            Emitter::new(lanes.iter().collect(), Duration::ZERO, &stats, progress).unwrap();
        let emitted = emitter.run(&inputs).unwrap();
        (emitted, collector.join().unwrap())
    })
    .unwrap();

    assert_eq!(emitted.dispatched, 3);
    assert_eq!(collected.jobs, 3);
    assert_eq!(collected.shutdowns, 2);
    assert!(merged.is_empty());
    assert!(lanes.iter().all(|q| q.is_empty()));
    assert_eq!(stats.snapshot().per_lane, vec![2, 1]);
    assert_eq!(codec.encoded.load(Ordering::SeqCst), 3);
    assert_eq!(recorder.len(), 3);
}

#[test]
fn test_every_job_processed_exactly_once_under_load() {
    let codec = CountingCodec::default();
    let strategy = ExecutionStrategy::Pipeline {
        lanes: 4,
        preload: false,
    };
    let mut recorder = PerformanceRecorder::new(strategy.phases());
    let totals = strategy
        .execute(&paths(200), &codec, &mut recorder, &RunOptions::default())
        .unwrap();

    assert_eq!(totals.dispatched, 200);
    assert_eq!(totals.per_lane, vec![50, 50, 50, 50]);
    assert_eq!(codec.decoded.load(Ordering::SeqCst), 200);
    assert_eq!(codec.marked.load(Ordering::SeqCst), 200);
    assert_eq!(codec.encoded.load(Ordering::SeqCst), 200);

    let mut ids: Vec<_> = recorder.entries().iter().map(|e| e.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..200).collect::<Vec<_>>());

    for entry in recorder.entries() {
        for phase in strategy.phases() {
            let span = entry.timings.get(phase).unwrap();
            assert!(span.start() <= span.end());
        }
        let total = entry.timings.get(Phase::EndToEnd).unwrap();
        let store = entry.timings.get(Phase::Stage(StageKind::Store)).unwrap();
        assert!(total.start() <= store.start());
        assert!(store.end() <= total.end());
    }
}

#[test]
fn test_delay_spreads_dispatches() {
    let codec = CountingCodec::default();
    let strategy = ExecutionStrategy::Farm { lanes: 2 };
    let mut recorder = PerformanceRecorder::new(strategy.phases());
    let options = RunOptions {
        delay: Duration::from_millis(10),
        ..RunOptions::default()
    };
    strategy
        .execute(&paths(3), &codec, &mut recorder, &options)
        .unwrap();

    let ts_avg = recorder.summary().inter_arrival_ms.unwrap();
    assert!(ts_avg > 0.0);
}

fn image_dir(root: &Path, name: &str) -> PathBuf {
    let images = root.join(name);
    std::fs::create_dir(&images).unwrap();
    for file in ["a.png", "b.png", "c.png"] {
        RgbImage::from_pixel(3, 3, Rgb([200, 100, 0]))
            .save(images.join(file))
            .unwrap();
    }
    std::fs::write(images.join("notes.txt"), b"not an image").unwrap();
    images
}

#[test]
fn test_real_images_through_every_strategy() {
    let root = TempDir::new().unwrap();
    let codec = ImageCodec::new(
        RgbImage::from_pixel(3, 3, Rgb([0, 0, 0])),
        MarkRegion::default(),
    );

    let strategies = [
        ExecutionStrategy::Sequential,
        ExecutionStrategy::Farm { lanes: 2 },
        ExecutionStrategy::Pipeline {
            lanes: 2,
            preload: true,
        },
        ExecutionStrategy::Pipeline {
            lanes: 2,
            preload: false,
        },
    ];
    for (i, strategy) in strategies.into_iter().enumerate() {
        let images = image_dir(root.path(), &format!("run{i}"));
        let mut recorder = PerformanceRecorder::new(strategy.phases());
        let totals = strategy
            .execute(
                &DirectoryInput::new(&images),
                &codec,
                &mut recorder,
                &RunOptions::default(),
            )
            .unwrap();

        assert_eq!(recorder.len(), 3, "{}", strategy.name());
        assert_eq!(totals.enumerated, 4, "{}", strategy.name());
        assert_eq!(totals.dropped, 1, "{}", strategy.name());
        let marked = image::open(images.join("out_a.png")).unwrap().to_rgb8();
        // (200 + 100 + 0) / 3 = 100, (100 + 255) / 2 = 177
        assert_eq!(marked.get_pixel(2, 2).0, [177, 177, 177]);

        let report = RunReport::new(
            strategy.name(),
            strategy.lanes(),
            0,
            totals,
            recorder.summary(),
        );
        let text = TextReportGenerator.generate(&report).unwrap();
        assert!(text.contains("Processed: 3"));
    }
}
