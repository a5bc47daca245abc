use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const TEMPLATE: &str =
    "🖼  [{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} images {spinner} {msg}";

/// Progress display advanced by the Collector.
///
/// The Emitter sets the total once the inputs are enumerated. Draws to
/// stderr, and only when stderr is a terminal.
#[derive(Debug, Clone)]
pub struct RunProgress {
    bar: ProgressBar,
}

impl RunProgress {
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self::hidden();
        }

        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn set_total(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    pub fn job_done(&self) {
        self.bar.inc(1);
    }

    /// A job that will never reach the Collector
    pub fn job_dropped(&self) {
        self.bar.inc(1);
        self.bar.set_message("(some inputs dropped)");
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}
