//! Frame and section timing for the headless driver
//!
//! Keeps a rolling window of frame times for FPS and aggregate statistics per
//! named section (e.g. "physics"). Nothing in the core depends on it.

use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use log::info;

/// Frames kept for the rolling FPS average
pub const FRAME_WINDOW: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionStats {
    pub average_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub samples: usize,
}

impl Default for SectionStats {
    fn default() -> Self {
        Self {
            average_ms: 0.0,
            min_ms: f64::MAX,
            max_ms: 0.0,
            samples: 0,
        }
    }
}

impl SectionStats {
    fn record(&mut self, ms: f64) {
        self.samples += 1;
        // running mean
        self.average_ms += (ms - self.average_ms) / self.samples as f64;
        self.min_ms = self.min_ms.min(ms);
        self.max_ms = self.max_ms.max(ms);
    }
}

#[derive(Debug, Default)]
pub struct Profiler {
    sections: BTreeMap<String, SectionStats>,
    frame_times: VecDeque<f64>, // seconds, newest last
    frame_start: Option<Instant>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    pub fn end_frame(&mut self) {
        if let Some(start) = self.frame_start.take() {
            self.record_frame_time(start.elapsed());
        }
    }

    /// Record a frame duration measured elsewhere
    pub fn record_frame_time(&mut self, elapsed: Duration) {
        self.frame_times.push_back(elapsed.as_secs_f64());
        if self.frame_times.len() > FRAME_WINDOW {
            self.frame_times.pop_front();
        }
    }

    /// Run `f`, charging its wall time to section `name`
    pub fn measure<R>(&mut self, name: &str, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let out = f();
        self.record_section(name, start.elapsed());
        out
    }

    pub fn record_section(&mut self, name: &str, elapsed: Duration) {
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.sections.entry(name.to_string()).or_default().record(ms);
    }

    pub fn section(&self, name: &str) -> Option<SectionStats> {
        self.sections.get(name).copied()
    }

    /// FPS of the most recent frame
    pub fn current_fps(&self) -> f64 {
        match self.frame_times.back() {
            Some(&t) if t > 0.0 => 1.0 / t,
            _ => 0.0,
        }
    }

    /// FPS over the rolling window
    pub fn average_fps(&self) -> f64 {
        let total: f64 = self.frame_times.iter().sum();
        if total > 0.0 {
            self.frame_times.len() as f64 / total
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        self.sections.clear();
        self.frame_times.clear();
        self.frame_start = None;
    }

    /// Log a summary of every section and the frame rate
    pub fn report(&self) {
        info!("=== performance report ===");
        info!("fps: {:.1} current, {:.1} average", self.current_fps(), self.average_fps());
        for (name, s) in &self.sections {
            info!(
                "{:<12} avg {:8.3} ms  min {:8.3} ms  max {:8.3} ms  ({} samples)",
                name, s.average_ms, s.min_ms, s.max_ms, s.samples
            );
        }
    }
}
