//! Confirm-delete dialog

use egui::{Align2, Color32, Key, RichText, Vec2};
use mdp_console::DeleteConfirm;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmAction {
    Confirm,
    Cancel,
}

/// Render the confirmation for `confirm`; `None` while the user decides.
pub fn confirm_delete_modal(ctx: &egui::Context, confirm: &DeleteConfirm) -> Option<ConfirmAction> {
    if ctx.input(|i| i.key_pressed(Key::Escape)) {
        return Some(ConfirmAction::Cancel);
    }

    let mut action = None;
    egui::Window::new("Confirm Delete")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(confirm.message());
            ui.label(
                RichText::new("This cannot be undone.")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    action = Some(ConfirmAction::Cancel);
                }
                let delete = egui::Button::new(RichText::new("Delete").color(Color32::WHITE))
                    .fill(Color32::from_rgb(180, 50, 50));
                if ui.add(delete).clicked() {
                    action = Some(ConfirmAction::Confirm);
                }
            });
        });
    action
}
