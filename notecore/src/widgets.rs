//! Small widgets shared by the editor's panels and dialogs

use egui::Ui;

/// Status bar: panel fill, 1px top border
pub fn status_bar(ui: &mut Ui, left: &str, right: &str) {
    egui::Frame::none()
        .fill(ui.visuals().panel_fill)
        .stroke(ui.visuals().widgets.noninteractive.bg_stroke)
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(left);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(right);
                });
            });
        });
}

/// A shortcut and its description, for help dialogs.
pub fn shortcut_row(ui: &mut Ui, shortcut: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(shortcut).monospace().strong());
        ui.add_space(20.0);
        ui.label(description);
    });
}

/// Label the platform's command key the way menus show it.
pub fn command_key_label(key: &str) -> String {
    if cfg!(target_os = "macos") {
        format!("\u{2318}{}", key)
    } else {
        format!("Ctrl+{}", key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_key_label() {
        let label = command_key_label("S");
        assert!(label.ends_with('S'));
        assert!(label == "\u{2318}S" || label == "Ctrl+S");
    }
}
