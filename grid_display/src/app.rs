// app.rs - Viewer state: step-then-render over a Model

use std::time::{Duration, Instant};

use automaton::{CycleDetector, Frame, Model, Recorder, SimulationConfig};
use egui::Color32;
use tracing::{error, info, warn};

/// Drives a [`Model`] and keeps the last rendered [`Frame`].
///
/// The UI only reads `frame`; every change to the automaton goes through
/// [`Viewer::advance`] or [`Viewer::reset`].
pub struct Viewer {
    config: SimulationConfig,
    model: Model,
    pub frame: Frame,
    pub recorder: Recorder,
    detector: CycleDetector,

    pub is_running: bool,
    pub last_update: Instant,
    pub update_interval: Duration,
    pub frame_limit: Option<u64>,
    pub pause_on_cycle: bool,
    pub status: Option<String>,

    pub live_color: Color32,
    pub dead_color: Color32,
}

impl Viewer {
    pub fn new(
        config: SimulationConfig,
        model: Model,
        update_interval: Duration,
        frame_limit: Option<u64>,
    ) -> Self {
        let mut detector = CycleDetector::default();
        model.detect_cycle(&mut detector);
        Self {
            config,
            frame: model.frame(),
            model,
            recorder: Recorder::default(),
            detector,
            is_running: false,
            last_update: Instant::now(),
            update_interval,
            frame_limit,
            pause_on_cycle: true,
            status: None,
            live_color: Color32::from_rgb(255, 200, 60),
            dead_color: Color32::from_gray(20),
        }
    }

    pub fn title(&self) -> String {
        self.model.name()
    }

    pub fn display_levels(&self) -> u32 {
        self.model.display_levels()
    }

    /// True once the generation limit from the command line is reached.
    pub fn finished(&self) -> bool {
        self.frame_limit
            .is_some_and(|limit| self.model.generation() >= limit)
    }

    /// One generation, then a fresh frame. Errors stop the run and are kept
    /// for display; the model is left at its last good generation.
    pub fn advance(&mut self) {
        if self.finished() {
            self.is_running = false;
            return;
        }
        match self.model.step() {
            Ok(stats) => {
                self.recorder.record(stats);
                self.frame = self.model.frame();
                if let Some(period) = self.model.detect_cycle(&mut self.detector) {
                    if self.pause_on_cycle && self.is_running {
                        info!(period, generation = stats.generation, "cycle detected, pausing");
                        self.is_running = false;
                        self.status = Some(format!("Repeats with period {period}"));
                    }
                }
                if self.finished() {
                    info!(generation = stats.generation, "frame limit reached");
                    self.is_running = false;
                    self.status = Some("Frame limit reached".to_string());
                }
            }
            Err(e) => {
                warn!(error = %e, "step failed");
                self.is_running = false;
                self.status = Some(e.to_string());
            }
        }
    }

    /// Rebuilds the model from the configuration it started with.
    pub fn reset(&mut self) {
        match Model::from_config(&self.config) {
            Ok(model) => {
                self.model = model;
                self.frame = self.model.frame();
                self.recorder.clear();
                self.detector.clear();
                self.model.detect_cycle(&mut self.detector);
                self.status = None;
            }
            Err(e) => {
                error!(error = %e, "reset failed");
                self.status = Some(e.to_string());
            }
        }
        self.is_running = false;
    }
}
