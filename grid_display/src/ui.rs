// ui.rs - egui rendering of the viewer

use std::time::{Duration, Instant};

use eframe::egui;
use egui::{Color32, Pos2, Rect, Stroke, Vec2};

use crate::app::Viewer;

const MAX_BOX: f32 = 15.0;
const SPACING: f32 = 0.5;

fn blend(dead: Color32, live: Color32, t: f32) -> Color32 {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color32::from_rgb(
        mix(dead.r(), live.r()),
        mix(dead.g(), live.g()),
        mix(dead.b(), live.b()),
    )
}

impl eframe::App for Viewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.is_running && self.last_update.elapsed() >= self.update_interval {
            self.advance();
            self.last_update = Instant::now();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.title());

            ui.horizontal(|ui| {
                let button_text = if self.is_running { "⏸ Pause" } else { "▶ Start" };
                if ui
                    .add_enabled(!self.finished(), egui::Button::new(button_text))
                    .clicked()
                {
                    self.is_running = !self.is_running;
                    if self.is_running {
                        self.status = None;
                        self.last_update = Instant::now();
                    }
                }

                if ui.button("⏭ Step").clicked() {
                    self.is_running = false;
                    self.advance();
                }

                if ui.button("⟲ Reset").clicked() {
                    self.reset();
                }

                ui.checkbox(&mut self.pause_on_cycle, "Pause on cycle");

                ui.separator();
                ui.label(format!("Generation: {}", self.frame.generation()));
            });

            ui.horizontal(|ui| {
                ui.label("Speed:");
                let mut speed = 1000.0 / self.update_interval.as_millis().max(1) as f32;
                if ui
                    .add(egui::Slider::new(&mut speed, 0.5..=90.0).suffix(" gen/sec"))
                    .changed()
                {
                    self.update_interval = Duration::from_millis((1000.0 / speed) as u64);
                }

                ui.separator();

                ui.label("Live:");
                ui.color_edit_button_srgba(&mut self.live_color);
                ui.label("Dead:");
                ui.color_edit_button_srgba(&mut self.dead_color);
            });

            if let Some(status) = &self.status {
                ui.colored_label(Color32::LIGHT_RED, status.as_str());
            }

            ui.separator();
            self.draw_grid(ui);
            ui.separator();
            self.draw_stats(ui);
        });

        if self.is_running {
            ctx.request_repaint_after(self.update_interval);
        }
    }
}

impl Viewer {
    fn draw_grid(&self, ui: &mut egui::Ui) {
        let (rows, cols) = (self.frame.rows(), self.frame.cols());
        let room = ui.available_size() - Vec2::new(0.0, 80.0);
        let box_size = (room.x / cols as f32)
            .min(room.y / rows as f32)
            .clamp(1.0, MAX_BOX);
        let spacing = if box_size > 4.0 { SPACING } else { 0.0 };
        let step = box_size + spacing;

        let total_size = Vec2::new(step * cols as f32 - spacing, step * rows as f32 - spacing);
        let (response, painter) = ui.allocate_painter(total_size, egui::Sense::hover());
        let origin = response.rect.min;

        painter.rect_filled(response.rect, 0.0, self.dead_color);

        let floor = self.display_levels();
        for row in 0..rows {
            for col in 0..cols {
                let level = self.frame.intensity(row, col, floor);
                let rect = Rect::from_min_size(
                    Pos2::new(origin.x + col as f32 * step, origin.y + row as f32 * step),
                    Vec2::splat(box_size),
                );
                if level > 0.0 {
                    painter.rect_filled(rect, 1.0, blend(self.dead_color, self.live_color, level));
                }
                if spacing > 0.0 {
                    painter.rect_stroke(rect, 1.0, Stroke::new(0.2, Color32::from_gray(60)));
                }
            }
        }
    }

    fn draw_stats(&self, ui: &mut egui::Ui) {
        let cells = self.frame.rows() * self.frame.cols();
        let live = self.frame.live_cells();
        ui.horizontal(|ui| {
            ui.label(format!("Live cells: {live}"));
            ui.label(format!("Population: {:.1}%", live as f32 / cells as f32 * 100.0));
            if let Some(last) = self.recorder.last() {
                ui.label(format!("Changed: {}", last.changed));
            }
            ui.label(format!("Total changed: {}", self.recorder.total_changed()));
        });

        // recent `changed` counts as a sparkline
        let series = self.recorder.series();
        let (response, painter) =
            ui.allocate_painter(Vec2::new(ui.available_width(), 40.0), egui::Sense::hover());
        let rect = response.rect;
        let top = series.iter().copied().max().unwrap_or(0).max(1) as f32;
        let dx = rect.width() / series.len().max(2).saturating_sub(1) as f32;
        let points: Vec<Pos2> = series
            .iter()
            .enumerate()
            .map(|(i, &v)| Pos2::new(rect.min.x + i as f32 * dx, rect.max.y - v as f32 / top * rect.height()))
            .collect();
        painter.add(egui::Shape::line(points, Stroke::new(1.0, self.live_color)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_ends() {
        let dead = Color32::from_rgb(0, 10, 20);
        let live = Color32::from_rgb(200, 110, 20);
        assert_eq!(blend(dead, live, 0.0), dead);
        assert_eq!(blend(dead, live, 1.0), live);
        assert_eq!(blend(dead, live, 0.5), Color32::from_rgb(100, 60, 20));
    }
}
