use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use indicatif::{HumanBytes, HumanDuration, ProgressBar, ProgressDrawTarget, ProgressStyle};
use url::Url;

#[derive(Debug, Clone, Copy)]
pub enum Resource {
    Jobs,
    Prep,
}

impl Resource {
    pub fn label(self) -> &'static str {
        match self {
            Resource::Jobs => "jobs",
            Resource::Prep => "prep",
        }
    }
}

pub struct Progress {
    enabled: bool,
    start: Instant,
    bar: ProgressBar,

    in_flight: AtomicU64,
    done: AtomicU64,
    failed: AtomicU64,
    bytes: AtomicU64,
    stage: Mutex<String>,
    last: Mutex<String>,
}

impl Progress {
    pub fn new(enabled: bool) -> Arc<Self> {
        let bar = if enabled {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}  [{elapsed_precise}]")
            {
                bar.set_style(style);
            }
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        } else {
            ProgressBar::hidden()
        };

        Arc::new(Self {
            enabled,
            start: Instant::now(),
            bar,
            in_flight: AtomicU64::new(0),
            done: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            stage: Mutex::new(String::new()),
            last: Mutex::new(String::new()),
        })
    }

    pub fn set_stage(&self, msg: impl Into<String>) {
        if !self.enabled {
            return;
        }
        if let Ok(mut stage) = self.stage.lock() {
            *stage = msg.into();
        }
        self.refresh();
    }

    pub fn fetch_start(&self, resource: Resource, url: &Url) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        self.set_last(format!("GET {} ({})", url, resource.label()));
    }

    pub fn fetch_ok(&self, resource: Resource, url: &Url, bytes: usize) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.done.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        self.set_last(format!("GET {} ({}) ok {}B", url, resource.label(), bytes));
    }

    pub fn fetch_err(&self, resource: Resource, url: &Url) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.set_last(format!("GET {} ({}) failed", url, resource.label()));
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        self.refresh();
        self.bar.finish_and_clear();
        self.bar
            .println(format!("Done in {}", HumanDuration(self.start.elapsed())));
    }

    fn set_last(&self, label: String) {
        if !self.enabled {
            return;
        }
        if let Ok(mut last) = self.last.lock() {
            *last = label;
        }
        self.refresh();
    }

    fn refresh(&self) {
        if !self.enabled {
            return;
        }
        let stage = self.stage.lock().map(|s| s.clone()).unwrap_or_default();
        let last = self.last.lock().map(|s| s.clone()).unwrap_or_default();
        self.bar.set_message(format!(
            "{stage} | fetched {done} failed {failed} in-flight {in_flight} | {bytes} | {last}",
            done = self.done.load(Ordering::Relaxed),
            failed = self.failed.load(Ordering::Relaxed),
            in_flight = self.in_flight.load(Ordering::Relaxed),
            bytes = HumanBytes(self.bytes.load(Ordering::Relaxed)),
        ));
    }
}
