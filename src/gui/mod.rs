pub mod canvas;

use crate::draw::model::Color;
use crate::recognize::client::RecognitionService;
use crate::recognize::worker::SubmissionWorker;
use crate::session::{Session, SubmitOutcome, SubmitStatus};
use crate::settings::Settings;
use canvas::{color32, show_annotations, show_canvas, CanvasTexture};
use eframe::egui::{self, Color32, RichText, Stroke, Vec2};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::sync::Arc;
use std::time::Duration;

pub struct SketchApp {
    session: Session,
    worker: SubmissionWorker,
    swatches: Vec<Color>,
    texture: CanvasTexture,
    toasts: Toasts,
    toast_duration: f32,
    sized_to_window: bool,
}

impl SketchApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        service: Arc<dyn RecognitionService>,
    ) -> Self {
        let repaint_ctx = cc.egui_ctx.clone();
        let worker = SubmissionWorker::new(service)
            .with_notifier(Arc::new(move || repaint_ctx.request_repaint()));
        Self {
            session: Session::new(&settings),
            worker,
            swatches: settings.swatches.clone(),
            texture: CanvasTexture::default(),
            toasts: Toasts::new()
                .anchor(egui::Align2::RIGHT_TOP, (10.0, 10.0))
                .direction(egui::Direction::TopDown),
            toast_duration: settings.toast_duration,
            sized_to_window: false,
        }
    }

    fn toast(&mut self, kind: ToastKind, text: String) {
        self.toasts.add(Toast {
            text: text.into(),
            kind,
            options: ToastOptions::default().duration_in_seconds(self.toast_duration as f64),
        });
    }

    fn generate(&mut self) {
        if self.worker.in_flight() > 0 {
            // A request abandoned by reset is still running.
            tracing::debug!(in_flight = self.worker.in_flight(), "generate deferred");
            self.toast(ToastKind::Info, "Previous request still running".into());
            return;
        }
        match self.session.begin_submit() {
            Ok(pending) => self.worker.dispatch(pending),
            Err(err) => {
                tracing::warn!("generate rejected: {err}");
                self.toast(ToastKind::Warning, err.to_string());
            }
        }
    }

    fn drain_completions(&mut self) {
        while let Some(done) = self.worker.poll() {
            match self.session.complete_submit(done) {
                SubmitOutcome::Applied { annotations: 0, .. } => {
                    self.toast(ToastKind::Info, "Nothing recognized".into());
                }
                SubmitOutcome::Applied { .. } | SubmitOutcome::Stale => {}
                SubmitOutcome::Failed(err) => {
                    self.toast(ToastKind::Error, err.to_string());
                }
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = Vec2::splat(10.0);
        if ui
            .add_sized([150.0, 28.0], egui::Button::new("Reset"))
            .clicked()
        {
            self.session.reset();
        }

        let selected = self.session.surface().color();
        let mut picked = None;
        ui.horizontal_wrapped(|ui| {
            ui.set_max_width(150.0);
            for swatch in &self.swatches {
                let stroke = if *swatch == selected {
                    Stroke::new(2.0, Color32::WHITE)
                } else {
                    Stroke::new(1.0, Color32::DARK_GRAY)
                };
                let button = egui::Button::new("")
                    .fill(color32(*swatch))
                    .stroke(stroke)
                    .rounding(12.0)
                    .min_size(Vec2::splat(24.0));
                if ui.add(button).on_hover_text(swatch.to_string()).clicked() {
                    picked = Some(*swatch);
                }
            }
        });
        if let Some(color) = picked {
            self.session.select_color(color);
        }

        let busy = self.session.is_busy() || self.worker.in_flight() > 0;
        if ui
            .add_enabled_ui(!busy, |ui| {
                ui.add_sized([150.0, 28.0], egui::Button::new("Generate"))
            })
            .inner
            .clicked()
        {
            self.generate();
        }

        match self.session.status() {
            SubmitStatus::Busy => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Recognizing…");
                });
            }
            SubmitStatus::Failed(msg) => {
                ui.label(RichText::new(msg).color(Color32::LIGHT_RED));
            }
            SubmitStatus::Idle | SubmitStatus::Succeeded { .. } if busy => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Finishing previous request…");
                });
            }
            SubmitStatus::Idle | SubmitStatus::Succeeded { .. } => {}
        }
    }
}

impl eframe::App for SketchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_completions();
        if self.session.is_busy() || self.worker.in_flight() > 0 {
            ctx.request_repaint_after(Duration::from_millis(200));
        }

        egui::SidePanel::left("toolbar")
            .resizable(false)
            .frame(
                egui::Frame::side_top_panel(&ctx.style())
                    .fill(Color32::from_gray(0x33))
                    .inner_margin(egui::Margin::same(16.0)),
            )
            .show(ctx, |ui| self.toolbar(ui));

        let canvas = egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                if !self.sized_to_window {
                    let available = ui.available_size();
                    if available.x >= 1.0 && available.y >= 1.0 {
                        self.session
                            .surface_mut()
                            .resize(available.x as u32, available.y as u32);
                    }
                    self.sized_to_window = true;
                }
                show_canvas(ui, &mut self.session, &mut self.texture)
            })
            .inner;

        show_annotations(ctx, &mut self.session, canvas);
        self.toasts.show(ctx);
    }
}
