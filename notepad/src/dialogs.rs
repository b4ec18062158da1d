//! Prompt and message dialogs
//!
//! Each prompt owns its input fields while open and yields a
//! `PromptAction` when confirmed. Messages queue up and are shown one at a
//! time, like a run of modal message boxes.

use egui::{Align2, Color32, Context, Key};
use std::collections::VecDeque;

/// An open input dialog
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Find { query: String },
    Replace { find: String, replace: String },
    FontSize { input: String },
    Background { color: Color32 },
}

/// What a confirmed prompt asks the editor to do
#[derive(Debug, Clone, PartialEq)]
pub enum PromptAction {
    Find(String),
    Replace { find: String, replace: String },
    /// `None` when the input was not a whole number
    FontSize(Option<i64>),
    Background(Color32),
}

impl Prompt {
    pub fn find() -> Self {
        Prompt::Find { query: String::new() }
    }

    pub fn replace() -> Self {
        Prompt::Replace { find: String::new(), replace: String::new() }
    }

    pub fn font_size() -> Self {
        Prompt::FontSize { input: String::new() }
    }

    pub fn background(current: Color32) -> Self {
        Prompt::Background { color: current }
    }

    fn title(&self) -> &'static str {
        match self {
            Prompt::Find { .. } => "Find",
            Prompt::Replace { .. } => "Replace",
            Prompt::FontSize { .. } => "Font Size",
            Prompt::Background { .. } => "Background Colour",
        }
    }

    /// The action for the current field values.
    pub fn action(&self) -> PromptAction {
        match self {
            Prompt::Find { query } => PromptAction::Find(query.clone()),
            Prompt::Replace { find, replace } => PromptAction::Replace {
                find: find.clone(),
                replace: replace.clone(),
            },
            Prompt::FontSize { input } => PromptAction::FontSize(parse_font_size(input)),
            Prompt::Background { color } => PromptAction::Background(*color),
        }
    }
}

/// Whole number, surrounding whitespace allowed.
pub fn parse_font_size(input: &str) -> Option<i64> {
    input.trim().parse::<i64>().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub title: String,
    pub body: String,
}

/// Pending message boxes, oldest first
#[derive(Debug, Default)]
pub struct MessageQueue {
    pending: VecDeque<Message>,
}

impl MessageQueue {
    pub fn info(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.pending.push_back(Message {
            kind: MessageKind::Info,
            title: title.into(),
            body: body.into(),
        });
    }

    pub fn error(&mut self, title: impl Into<String>, body: impl Into<String>) {
        let body = body.into();
        tracing::warn!(message = %body, "error shown to user");
        self.pending.push_back(Message {
            kind: MessageKind::Error,
            title: title.into(),
            body,
        });
    }

    pub fn current(&self) -> Option<&Message> {
        self.pending.front()
    }

    pub fn dismiss(&mut self) {
        self.pending.pop_front();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Draw the front message. OK dismisses it, and so does Enter when
    /// `enter_dismisses` is set (no text field is taking the key).
    pub fn show(&mut self, ctx: &Context, enter_dismisses: bool) {
        let Some(message) = self.current().cloned() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new(message.title.as_str())
            .id(egui::Id::new("message_box"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let icon = match message.kind {
                        MessageKind::Info => "\u{2139}",
                        MessageKind::Error => "\u{26a0}",
                    };
                    ui.label(egui::RichText::new(icon).heading());
                    ui.label(message.body.as_str());
                });
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
                if self.len() > 1 {
                    ui.small(format!("{} more", self.len() - 1));
                }
            });
        if dismissed || (enter_dismisses && ctx.input(|i| i.key_pressed(Key::Enter))) {
            self.dismiss();
        }
    }
}

/// Draw `prompt` if open. Returns the action when confirmed; the prompt is
/// closed on confirm and on cancel.
pub fn show_prompt(ctx: &Context, prompt: &mut Option<Prompt>) -> Option<PromptAction> {
    let current = prompt.as_mut()?;
    let mut confirmed = false;
    let mut cancelled = false;

    egui::Window::new(current.title())
        .id(egui::Id::new("prompt"))
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            match current {
                Prompt::Find { query } => {
                    ui.label("Enter text to find:");
                    ui.text_edit_singleline(query).request_focus();
                }
                Prompt::Replace { find, replace } => {
                    egui::Grid::new("replace_grid").num_columns(2).show(ui, |ui| {
                        ui.label("Enter text to find:");
                        ui.text_edit_singleline(find);
                        ui.end_row();
                        ui.label("Enter replacement text:");
                        ui.text_edit_singleline(replace);
                        ui.end_row();
                    });
                }
                Prompt::FontSize { input } => {
                    ui.label("Enter Font Size:");
                    ui.text_edit_singleline(input).request_focus();
                }
                Prompt::Background { color } => {
                    egui::color_picker::color_picker_color32(
                        ui,
                        color,
                        egui::color_picker::Alpha::Opaque,
                    );
                }
            }
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    confirmed = true;
                }
                if ui.button("Cancel").clicked() {
                    cancelled = true;
                }
            });
        });

    ctx.input(|i| {
        if i.key_pressed(Key::Enter) {
            confirmed = true;
        }
        if i.key_pressed(Key::Escape) {
            cancelled = true;
        }
    });

    if cancelled {
        *prompt = None;
        return None;
    }
    if confirmed {
        return prompt.take().map(|p| p.action());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_font_size() {
        assert_eq!(parse_font_size("18"), Some(18));
        assert_eq!(parse_font_size("  24 "), Some(24));
        assert_eq!(parse_font_size("-3"), Some(-3));
        assert_eq!(parse_font_size("12.5"), None);
        assert_eq!(parse_font_size(""), None);
    }

    #[test]
    fn test_prompt_actions() {
        let p = Prompt::Replace { find: "a".into(), replace: "b".into() };
        assert_eq!(p.action(), PromptAction::Replace { find: "a".into(), replace: "b".into() });
        let p = Prompt::FontSize { input: "x".into() };
        assert_eq!(p.action(), PromptAction::FontSize(None));
        assert_eq!(Prompt::find().action(), PromptAction::Find(String::new()));
        assert_eq!(
            Prompt::background(Color32::RED).action(),
            PromptAction::Background(Color32::RED)
        );
    }

    #[test]
    fn test_message_queue_order() {
        let mut q = MessageQueue::default();
        assert!(q.current().is_none());
        q.info("Info", "first");
        q.error("Error", "second");
        assert_eq!(q.len(), 2);
        assert_eq!(q.current().unwrap().body, "first");
        q.dismiss();
        assert_eq!(q.current().unwrap().kind, MessageKind::Error);
        q.dismiss();
        assert!(q.is_empty());
        q.dismiss();
        assert!(q.is_empty());
    }

    fn enter_frame() -> egui::RawInput {
        egui::RawInput {
            events: vec![egui::Event::Key {
                key: Key::Enter,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers: Default::default(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_enter_only_dismisses_when_free() {
        let ctx = Context::default();
        let mut q = MessageQueue::default();
        q.info("Find", "first");
        q.info("Find", "second");

        let _ = ctx.run(enter_frame(), |ctx| q.show(ctx, false));
        assert_eq!(q.len(), 2);

        let _ = ctx.run(enter_frame(), |ctx| q.show(ctx, true));
        assert_eq!(q.len(), 1);
        assert_eq!(q.current().unwrap().body, "second");

        let _ = ctx.run(egui::RawInput::default(), |ctx| q.show(ctx, true));
        assert_eq!(q.len(), 1);
    }
}
