//! Toast layer
//!
//! Drains the app's [`Notices`] queue each frame and shows them stacked in
//! the bottom-right corner until they expire or are clicked away.

use egui::{Align2, Color32, RichText, Vec2};
use mdp_console::{Notice, Notices, Severity};

const TOAST_SECS: f64 = 4.0;
const ERROR_TOAST_SECS: f64 = 8.0;
const MAX_TOASTS: usize = 5;

struct Toast {
    notice: Notice,
    expires_at: f64,
}

#[derive(Default)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Move queued notices into the toast layer.
    pub fn absorb(&mut self, notices: &mut Notices, now: f64) {
        for notice in notices.drain() {
            let ttl = match notice.severity {
                Severity::Error => ERROR_TOAST_SECS,
                _ => TOAST_SECS,
            };
            self.items.push(Toast {
                notice,
                expires_at: now + ttl,
            });
        }
        if self.items.len() > MAX_TOASTS {
            let excess = self.items.len() - MAX_TOASTS;
            self.items.drain(..excess);
        }
    }

    pub fn prune(&mut self, now: f64) {
        self.items.retain(|t| t.expires_at > now);
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        self.prune(now);
        if self.items.is_empty() {
            return;
        }

        let mut dismissed = None;
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(Align2::RIGHT_BOTTOM, Vec2::new(-12.0, -12.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for (idx, toast) in self.items.iter().enumerate() {
                    let color = severity_color(toast.notice.severity);
                    let frame = egui::Frame::popup(ui.style()).stroke((1.0, color));
                    let response = frame
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.label(RichText::new(&toast.notice.message).color(color));
                        })
                        .response
                        .interact(egui::Sense::click());
                    if response.clicked() {
                        dismissed = Some(idx);
                    }
                    ui.add_space(4.0);
                }
            });

        if let Some(idx) = dismissed {
            self.items.remove(idx);
        }
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}

pub fn severity_color(severity: Severity) -> Color32 {
    match severity {
        Severity::Info => Color32::LIGHT_BLUE,
        Severity::Success => Color32::from_rgb(80, 200, 120),
        Severity::Warning => Color32::from_rgb(230, 180, 60),
        Severity::Error => Color32::from_rgb(230, 80, 80),
    }
}
