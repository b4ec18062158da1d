//! The editor window
//!
//! Uses egui's `TextEdit::multiline` for editing, with a layouter that draws
//! each character with the tags the document keeps for it. Formatting, find,
//! spell check and undo go through `Document`; the widget only edits text.

use crate::autosave::Autosaver;
use crate::config::{Settings, APP_NAME};
use crate::dialogs::{show_prompt, MessageQueue, Prompt, PromptAction};
use crate::document::{style_runs, CharStyle, Document, EditError, Tag};
use crate::spell::Dictionary;
use egui::text::{CCursor, CCursorRange, LayoutJob, TextFormat};
use egui::{Align2, Context, FontId, Key, Stroke};
use notecore::repaint::RepaintController;
use notecore::safety::{catch_or, char_to_byte};
use notecore::storage::{self, config_dir, display_name, documents_dir, RecentFiles};
use notecore::theme::{bold_font, consume_zoom_keys, menu_bar, NoteColors, NoteTheme, Palette};
use notecore::widgets::{command_key_label, shortcut_row, status_bar};
use std::ops::Range;
use std::path::{Path, PathBuf};

const APP_TITLE: &str = "Notepad";

type Action = Box<dyn FnOnce(&mut NotepadApp, &Context)>;

pub struct NotepadApp {
    doc: Document,
    file_path: Option<PathBuf>,
    modified: bool,
    settings: Settings,
    recent_files: RecentFiles,
    dictionary: Dictionary,
    autosaver: Option<Autosaver>,
    prompt: Option<Prompt>,
    messages: MessageQueue,
    status: Option<String>,
    show_about: bool,
    show_shortcuts: bool,
    show_close_confirm: bool,
    close_confirmed: bool,
    last_title: String,
    repaint: RepaintController,
    editor_id: egui::Id,
}

impl NotepadApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let recent_files = RecentFiles::load(&recent_path())
            .unwrap_or_else(|_| RecentFiles::new(settings.recent_limit));
        let dictionary = Dictionary::load(&config_dir(APP_NAME));
        let doc = Document::new();
        let autosaver = settings.autosave_enabled.then(|| {
            Autosaver::spawn(settings.autosave_path.clone(), settings.autosave_interval(), &doc.text)
        });

        Self {
            doc,
            file_path: None,
            modified: false,
            settings,
            recent_files,
            dictionary,
            autosaver,
            prompt: None,
            messages: MessageQueue::default(),
            status: None,
            show_about: false,
            show_shortcuts: false,
            show_close_confirm: false,
            close_confirmed: false,
            last_title: String::new(),
            repaint: RepaintController::new(),
            editor_id: egui::Id::new("notepad_editor"),
        }
    }

    // ---------------------------------------------------------------
    // File
    // ---------------------------------------------------------------

    fn new_document(&mut self) {
        self.doc = Document::new();
        self.file_path = None;
        self.modified = false;
        self.status = None;
        self.publish();
        tracing::info!("new document");
    }

    fn show_open_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Text files", &["txt"])
            .add_filter("All files", &["*"])
            .set_directory(self.dialog_dir())
            .pick_file();
        if let Some(path) = picked {
            self.open_file(path);
        }
    }

    pub fn open_file(&mut self, path: PathBuf) {
        match storage::read_text(&path) {
            Ok(text) => {
                self.doc = Document::from_plain_text(text);
                tracing::info!(path = %path.display(), "opened");
                self.recent_files.add(path.clone());
                self.save_recent();
                self.file_path = Some(path);
                self.modified = false;
                self.status = None;
                self.publish();
            }
            Err(e) => {
                self.recent_files.remove(&path);
                self.save_recent();
                self.messages.error("Error", format!("Could not open {}:\n{}", path.display(), e));
            }
        }
    }

    fn save_document(&mut self) {
        match self.file_path.clone() {
            Some(path) => self.save_to(path),
            None => self.show_save_as_dialog(),
        }
    }

    fn show_save_as_dialog(&mut self) {
        let name = self
            .file_path
            .as_deref()
            .map(display_name)
            .unwrap_or_else(|| "untitled.txt".to_string());
        let picked = rfd::FileDialog::new()
            .add_filter("Text files", &["txt"])
            .add_filter("All files", &["*"])
            .set_directory(self.dialog_dir())
            .set_file_name(name)
            .save_file();
        if let Some(path) = picked {
            self.save_to(with_default_extension(path));
        }
    }

    fn save_to(&mut self, path: PathBuf) {
        self.doc.sync_after_edit();
        match storage::write_text(&path, &self.doc.text) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "saved");
                self.recent_files.add(path.clone());
                self.save_recent();
                self.file_path = Some(path);
                self.modified = false;
                self.messages.info("Info", "File saved successfully");
            }
            Err(e) => {
                self.messages.error("Error", format!("Could not save {}:\n{}", path.display(), e));
            }
        }
    }

    fn print_document(&mut self) {
        self.doc.sync_after_edit();
        let stdout = std::io::stdout();
        if let Err(e) = self.doc.print_to(&mut stdout.lock()) {
            self.messages.error("Error", format!("Printing failed:\n{}", e));
        }
    }

    fn dialog_dir(&self) -> PathBuf {
        self.file_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(documents_dir)
    }

    fn save_recent(&self) {
        if let Err(e) = self.recent_files.save(&recent_path()) {
            tracing::warn!(error = %e, "failed to save recent files");
        }
    }

    // ---------------------------------------------------------------
    // Selection and clipboard
    // ---------------------------------------------------------------

    /// Selected char range of the editor, if non-empty.
    fn selection(&self, ctx: &Context) -> Option<Range<usize>> {
        let state = egui::TextEdit::load_state(ctx, self.editor_id)?;
        let range = state.cursor.char_range()?;
        let (a, b) = (range.primary.index, range.secondary.index);
        (a != b).then(|| a.min(b)..a.max(b))
    }

    /// Cursor position, or the end of the text when the editor has none.
    fn cursor_index(&self, ctx: &Context) -> usize {
        egui::TextEdit::load_state(ctx, self.editor_id)
            .and_then(|s| s.cursor.char_range())
            .map(|r| r.primary.index)
            .unwrap_or_else(|| self.doc.char_count())
    }

    fn set_selection(&self, ctx: &Context, range: Range<usize>) {
        let mut state = egui::TextEdit::load_state(ctx, self.editor_id).unwrap_or_default();
        state.cursor.set_char_range(Some(CCursorRange::two(
            CCursor::new(range.start),
            CCursor::new(range.end),
        )));
        state.store(ctx, self.editor_id);
        ctx.memory_mut(|m| m.request_focus(self.editor_id));
    }

    fn selected_text(&self, ctx: &Context) -> Option<String> {
        let range = self.selection(ctx)?;
        Some(notecore::safety::char_slice(&self.doc.text, range.start, range.end).to_string())
    }

    /// Replace the chars in `range` with `insert`, as if typed.
    fn splice_text(&mut self, ctx: &Context, range: Range<usize>, insert: &str) {
        let start = char_to_byte(&self.doc.text, range.start);
        let end = char_to_byte(&self.doc.text, range.end);
        self.doc.text.replace_range(start..end, insert);
        self.after_text_edit();
        let caret = range.start + insert.chars().count();
        self.set_selection(ctx, caret..caret);
    }

    fn copy(&mut self, ctx: &Context) -> bool {
        let Some(text) = self.selected_text(ctx) else {
            return false;
        };
        match arboard::Clipboard::new().and_then(|mut c| c.set_text(text)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "clipboard unavailable");
                false
            }
        }
    }

    fn cut(&mut self, ctx: &Context) {
        if let Some(range) = self.selection(ctx) {
            if self.copy(ctx) {
                self.splice_text(ctx, range, "");
            }
        }
    }

    fn paste(&mut self, ctx: &Context) {
        let text = arboard::Clipboard::new()
            .and_then(|mut c| c.get_text())
            .unwrap_or_default();
        if text.is_empty() {
            return;
        }
        let range = self.selection(ctx).unwrap_or_else(|| {
            let at = self.cursor_index(ctx);
            at..at
        });
        self.splice_text(ctx, range, &text);
    }

    fn select_all(&mut self, ctx: &Context) {
        self.set_selection(ctx, 0..self.doc.char_count());
    }

    // ---------------------------------------------------------------
    // Edit
    // ---------------------------------------------------------------

    fn toggle_format(&mut self, ctx: &Context, tag: Tag, verb: &str) {
        let result = match self.selection(ctx) {
            Some(range) => self.doc.toggle_tag(range, tag),
            None => Err(EditError::NoSelection),
        };
        match result {
            Ok(_) => self.after_style_edit(),
            Err(_) => self.messages.info("Info", format!("Please select some text to {}.", verb)),
        }
    }

    fn make_bold(&mut self, ctx: &Context) {
        self.toggle_format(ctx, Tag::Bold, "bold");
    }

    fn make_italic(&mut self, ctx: &Context) {
        self.toggle_format(ctx, Tag::Italic, "italicize");
    }

    fn apply_font_size(&mut self, ctx: &Context, size: Option<i64>) {
        let result = match (size, self.selection(ctx)) {
            (Some(size), Some(range)) => self.doc.set_size(range, size),
            (None, _) => Err(EditError::InvalidSize(0)),
            (_, None) => Err(EditError::NoSelection),
        };
        match result {
            Ok(()) => self.after_style_edit(),
            Err(e) => {
                tracing::debug!(error = %e, "font size not applied");
                self.messages.info("Info", "Please select some text to change its font size.");
            }
        }
    }

    fn find(&mut self, query: &str) {
        let count = self.doc.highlight(query);
        self.status = Some(match count {
            0 => format!("'{}' not found", query),
            1 => "1 match".to_string(),
            n => format!("{} matches", n),
        });
    }

    fn replace(&mut self, find: &str, replace: &str) {
        let count = self.doc.replace_all(find, replace);
        if count > 0 {
            self.modified = true;
            self.publish();
        }
        self.status = Some(format!("replaced {} occurrence(s)", count));
    }

    fn spell_check(&mut self) {
        self.doc.sync_after_edit();
        self.doc.clear_tag(Tag::Misspelled);
        let misspellings = self.dictionary.check(&self.doc.text);
        tracing::info!(count = misspellings.len(), "spell check");
        if misspellings.is_empty() {
            self.messages.info("Spell Check", "No misspelled words found.");
            return;
        }
        for m in &misspellings {
            self.doc.tag_ranges(Tag::Misspelled, &m.ranges);
            if let Some(text) = m.message() {
                self.messages.info("Spelling Suggestion", text);
            }
        }
        self.status = Some(format!("{} misspelled word(s)", misspellings.len()));
    }

    fn add_selection_to_dictionary(&mut self, ctx: &Context) {
        let Some(word) = self.selected_text(ctx).map(|w| w.trim().to_string()) else {
            self.messages.info("Info", "Please select a word to add.");
            return;
        };
        if word.is_empty() || word.contains(char::is_whitespace) {
            self.messages.info("Info", "Please select a single word to add.");
            return;
        }
        match self.dictionary.add_to_user_dictionary(&word) {
            Ok(()) => self.status = Some(format!("added '{}' to the dictionary", word)),
            Err(e) => self.messages.error("Error", format!("Could not update the dictionary:\n{}", e)),
        }
    }

    fn undo(&mut self) {
        if self.doc.undo() {
            self.modified = true;
            self.publish();
        }
    }

    fn redo(&mut self) {
        if self.doc.redo() {
            self.modified = true;
            self.publish();
        }
    }

    // ---------------------------------------------------------------
    // Options
    // ---------------------------------------------------------------

    fn set_background(&mut self, color: egui::Color32) {
        self.settings.set_background(color);
        self.settings.save();
    }

    fn toggle_dark_mode(&mut self, ctx: &Context) {
        self.settings.toggle_dark_mode();
        NoteTheme::default().with_dark(self.settings.dark_mode).apply(ctx);
        self.settings.save();
        tracing::info!(dark = self.settings.dark_mode, "mode changed");
    }

    fn toggle_autosave(&mut self) {
        self.settings.autosave_enabled = !self.settings.autosave_enabled;
        self.autosaver = if self.settings.autosave_enabled {
            Some(Autosaver::spawn(
                self.settings.autosave_path.clone(),
                self.settings.autosave_interval(),
                &self.doc.text,
            ))
        } else {
            None
        };
        self.settings.save();
    }

    fn open_prompt(&mut self, ctx: &Context, prompt: Prompt) {
        ctx.memory_mut(|m| m.surrender_focus(self.editor_id));
        self.prompt = Some(prompt);
    }

    fn run_prompt_action(&mut self, ctx: &Context, action: PromptAction) {
        match action {
            PromptAction::Find(query) => {
                if !query.is_empty() {
                    self.find(&query);
                }
            }
            PromptAction::Replace { find, replace } => self.replace(&find, &replace),
            PromptAction::FontSize(size) => self.apply_font_size(ctx, size),
            PromptAction::Background(color) => self.set_background(color),
        }
    }

    // ---------------------------------------------------------------
    // Change tracking
    // ---------------------------------------------------------------

    fn after_text_edit(&mut self) {
        if self.doc.sync_after_edit() {
            self.modified = true;
            self.publish();
            self.repaint.mark_needs_repaint();
        }
    }

    fn after_style_edit(&mut self) {
        self.modified = true;
        self.repaint.mark_needs_repaint();
    }

    fn publish(&self) {
        if let Some(saver) = &self.autosaver {
            saver.publish(&self.doc.text);
        }
    }

    // ---------------------------------------------------------------
    // Frame
    // ---------------------------------------------------------------

    /// Handle command shortcuts before the TextEdit sees them. The widget's
    /// own undo is bypassed so history stays in `Document`.
    fn handle_keyboard(&mut self, ctx: &Context) {
        consume_zoom_keys(ctx);

        let mut actions: Vec<Action> = Vec::new();

        ctx.input_mut(|i| {
            let events = std::mem::take(&mut i.events);
            let mut remaining = Vec::new();

            for event in events {
                let mut handled = false;
                if let egui::Event::Key { key, pressed, modifiers, .. } = &event {
                    let cmd = modifiers.command;
                    let shift = modifiers.shift;
                    if cmd {
                        handled = true;
                        if *pressed {
                            match key {
                                Key::N => actions.push(Box::new(|s, _| s.new_document())),
                                Key::O => actions.push(Box::new(|s, _| s.show_open_dialog())),
                                Key::S if shift => actions.push(Box::new(|s, _| s.show_save_as_dialog())),
                                Key::S => actions.push(Box::new(|s, _| s.save_document())),
                                Key::P => actions.push(Box::new(|s, _| s.print_document())),
                                Key::B => actions.push(Box::new(|s, c| s.make_bold(c))),
                                Key::I => actions.push(Box::new(|s, c| s.make_italic(c))),
                                Key::F => actions.push(Box::new(|s, c| s.open_prompt(c, Prompt::find()))),
                                Key::H => actions.push(Box::new(|s, c| s.open_prompt(c, Prompt::replace()))),
                                Key::Z if shift => actions.push(Box::new(|s, _| s.redo())),
                                Key::Z => actions.push(Box::new(|s, _| s.undo())),
                                Key::Y => actions.push(Box::new(|s, _| s.redo())),
                                _ => handled = false,
                            }
                        } else {
                            handled = matches!(
                                key,
                                Key::N | Key::O | Key::S | Key::P | Key::B | Key::I | Key::F | Key::H | Key::Z | Key::Y
                            );
                        }
                    }
                }
                if !handled {
                    remaining.push(event);
                }
            }
            i.events = remaining;
        });

        for action in actions {
            action(self, ctx);
        }
    }

    fn render_menu_bar(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        menu_bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if shortcut_button(ui, "New", "N") {
                    self.new_document();
                    ui.close_menu();
                }
                if shortcut_button(ui, "Open...", "O") {
                    ui.close_menu();
                    self.show_open_dialog();
                }
                ui.menu_button("Open Recent", |ui| {
                    if self.recent_files.files.is_empty() {
                        ui.label("No recent files");
                    }
                    for path in self.recent_files.files.clone() {
                        if ui.button(display_name(&path)).clicked() {
                            self.open_file(path);
                            ui.close_menu();
                        }
                    }
                });
                ui.separator();
                if shortcut_button(ui, "Save", "S") {
                    ui.close_menu();
                    self.save_document();
                }
                if shortcut_button(ui, "Save As...", "Shift+S") {
                    ui.close_menu();
                    self.show_save_as_dialog();
                }
                if shortcut_button(ui, "Print", "P") {
                    self.print_document();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Exit").clicked() {
                    ui.close_menu();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                if shortcut_button(ui, "Undo", "Z") {
                    self.undo();
                    ui.close_menu();
                }
                if shortcut_button(ui, "Redo", "Shift+Z") {
                    self.redo();
                    ui.close_menu();
                }
                ui.separator();
                if shortcut_button(ui, "Cut", "X") {
                    self.cut(&ctx);
                    ui.close_menu();
                }
                if shortcut_button(ui, "Copy", "C") {
                    self.copy(&ctx);
                    ui.close_menu();
                }
                if shortcut_button(ui, "Paste", "V") {
                    self.paste(&ctx);
                    ui.close_menu();
                }
                if shortcut_button(ui, "Select All", "A") {
                    self.select_all(&ctx);
                    ui.close_menu();
                }
                ui.separator();
                if shortcut_button(ui, "Bold", "B") {
                    self.make_bold(&ctx);
                    ui.close_menu();
                }
                if shortcut_button(ui, "Italic", "I") {
                    self.make_italic(&ctx);
                    ui.close_menu();
                }
                if ui.button("Font Size...").clicked() {
                    self.open_prompt(&ctx, Prompt::font_size());
                    ui.close_menu();
                }
                ui.separator();
                if shortcut_button(ui, "Find...", "F") {
                    self.open_prompt(&ctx, Prompt::find());
                    ui.close_menu();
                }
                if shortcut_button(ui, "Replace...", "H") {
                    self.open_prompt(&ctx, Prompt::replace());
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Add to Dictionary").clicked() {
                    self.add_selection_to_dictionary(&ctx);
                    ui.close_menu();
                }
            });

            ui.menu_button("Options", |ui| {
                if ui.button("Background Colour...").clicked() {
                    let current = self.settings.palette().background;
                    self.open_prompt(&ctx, Prompt::background(current));
                    ui.close_menu();
                }
                let mode = if self.settings.dark_mode { "Light Mode" } else { "Dark Mode" };
                if ui.button(mode).clicked() {
                    self.toggle_dark_mode(&ctx);
                    ui.close_menu();
                }
                ui.separator();
                let mut wrap = self.settings.word_wrap;
                if ui.checkbox(&mut wrap, "Word Wrap").changed() {
                    self.settings.word_wrap = wrap;
                    self.settings.save();
                }
                let mut autosave = self.settings.autosave_enabled;
                if ui.checkbox(&mut autosave, "Autosave").changed() {
                    self.toggle_autosave();
                }
            });

            ui.menu_button("Info", |ui| {
                if ui.button("About App").clicked() {
                    self.show_about = true;
                    ui.close_menu();
                }
                if ui.button("Keyboard Shortcuts").clicked() {
                    self.show_shortcuts = true;
                    ui.close_menu();
                }
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("\u{1f50e} Check Spelling").clicked() {
                    self.spell_check();
                }
                if ui.add_enabled(self.doc.can_redo(), egui::Button::new("\u{21aa}")).on_hover_text("Redo").clicked() {
                    self.redo();
                }
                if ui.add_enabled(self.doc.can_undo(), egui::Button::new("\u{21a9}")).on_hover_text("Undo").clicked() {
                    self.undo();
                }
            });
        });
    }

    fn render_editor(&mut self, ui: &mut egui::Ui) {
        let palette = self.settings.palette();
        let base_size = self.settings.font_size;
        let wrap = self.settings.word_wrap;
        let editor_id = self.editor_id;

        ui.visuals_mut().text_cursor = Stroke::new(2.0, palette.cursor);

        egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
            let (text, styles) = self.doc.parts_mut();
            let mut layouter = |ui: &egui::Ui, text: &str, wrap_width: f32| {
                let mut job = build_layout_job(text, styles, base_size, palette);
                job.wrap.max_width = if wrap { wrap_width } else { f32::INFINITY };
                ui.fonts(|f| f.layout_job(job))
            };
            let desired_width = if wrap { ui.available_width() } else { f32::INFINITY };
            egui::TextEdit::multiline(text)
                .id(editor_id)
                .frame(false)
                .font(FontId::proportional(base_size))
                .desired_width(desired_width)
                .desired_rows(30)
                .lock_focus(true)
                .layouter(&mut layouter)
                .show(ui);
        });

        self.after_text_edit();
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        let mut left = format!(
            "{} lines  |  {} words, {} chars",
            self.doc.line_count(),
            self.doc.word_count(),
            self.doc.char_count()
        );
        if let Some(status) = &self.status {
            left.push_str("  |  ");
            left.push_str(status);
        }
        let right = match &self.autosaver {
            Some(saver) => match saver.last_saved() {
                Some(at) => format!("autosaved {}", at.format("%H:%M:%S")),
                None => format!("autosave every {}s", saver.interval().as_secs()),
            },
            None => "autosave off".to_string(),
        };
        status_bar(ui, &left, &right);
    }

    fn render_about(&mut self, ctx: &Context) {
        let secs = self.settings.autosave_interval().as_secs();
        egui::Window::new("About App")
            .collapsible(false)
            .resizable(false)
            .default_width(320.0)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("The Notepad App");
                    ui.label("A simple text editor for quick note-taking.");
                });
                ui.add_space(8.0);
                ui.label(egui::RichText::new("KEY FEATURES").strong());
                for feature in about_features(secs) {
                    ui.label(feature);
                }
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("Close").clicked() {
                        self.show_about = false;
                    }
                });
            });
    }

    fn render_shortcuts(&mut self, ctx: &Context) {
        egui::Window::new("Keyboard Shortcuts")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                for (key, description) in [
                    ("N", "New document"),
                    ("O", "Open"),
                    ("S", "Save"),
                    ("Shift+S", "Save as"),
                    ("P", "Print"),
                    ("B", "Bold"),
                    ("I", "Italic"),
                    ("F", "Find"),
                    ("H", "Replace"),
                    ("Z", "Undo"),
                    ("Shift+Z", "Redo"),
                    ("Y", "Redo"),
                ] {
                    shortcut_row(ui, &command_key_label(key), description);
                }
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("Close").clicked() {
                        self.show_shortcuts = false;
                    }
                });
            });
    }

    fn render_close_confirm(&mut self, ctx: &Context) {
        let name = self
            .file_path
            .as_deref()
            .map(display_name)
            .unwrap_or_else(|| "untitled".to_string());
        egui::Window::new("Unsaved Changes")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("Do you want to save changes to {}?", name));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        self.show_close_confirm = false;
                        self.save_document();
                        if !self.modified {
                            self.close_confirmed = true;
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    }
                    if ui.button("Don't Save").clicked() {
                        self.show_close_confirm = false;
                        self.close_confirmed = true;
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                    if ui.button("Cancel").clicked() {
                        self.show_close_confirm = false;
                    }
                });
            });
    }
}

impl eframe::App for NotepadApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.repaint.begin_frame(ctx);
        tracing::trace!(frame = self.repaint.frame(), reason = ?self.repaint.reason(), "frame");
        self.handle_keyboard(ctx);

        let dropped: Option<PathBuf> = ctx.input(|i| {
            i.raw.dropped_files.iter().find_map(|f| f.path.clone())
        });
        if let Some(path) = dropped {
            self.open_file(path);
        }

        let title = window_title(self.file_path.as_deref(), self.modified);
        if title != self.last_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_title = title;
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            catch_or((), || self.render_menu_bar(ui));
        });
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });
        let background = self.settings.palette().background;
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(background).inner_margin(egui::Margin::same(8.0)))
            .show(ctx, |ui| {
                catch_or((), || self.render_editor(ui));
            });

        // Messages first: Enter that confirms a prompt must not also dismiss
        // the message the prompt produces. Enter typed into the editor or a
        // prompt field belongs to that field.
        let enter_dismisses =
            self.prompt.is_none() && !ctx.memory(|m| m.has_focus(self.editor_id));
        self.messages.show(ctx, enter_dismisses);
        if let Some(action) = show_prompt(ctx, &mut self.prompt) {
            self.run_prompt_action(ctx, action);
        }
        if self.show_close_confirm {
            self.render_close_confirm(ctx);
        }
        if self.show_about {
            self.render_about(ctx);
        }
        if self.show_shortcuts {
            self.render_shortcuts(ctx);
        }

        if ctx.input(|i| i.viewport().close_requested()) && self.modified && !self.close_confirmed {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_close_confirm = true;
        }

        if let Some(saver) = &self.autosaver {
            self.repaint.schedule_after(saver.interval());
        }
        self.repaint.end_frame(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.settings.save();
        self.save_recent();
        self.autosaver = None;
        tracing::info!("exit");
    }
}

fn recent_path() -> PathBuf {
    config_dir(APP_NAME).join("recent.json")
}

fn shortcut_button(ui: &mut egui::Ui, label: &str, key: &str) -> bool {
    ui.add(egui::Button::new(label).shortcut_text(command_key_label(key)))
        .clicked()
}

/// `Notepad`, or `Notepad   -   <file name>`, with ` *` while modified.
pub fn window_title(path: Option<&Path>, modified: bool) -> String {
    let mut title = match path {
        Some(p) => format!("{}   -   {}", APP_TITLE, display_name(p)),
        None => APP_TITLE.to_string(),
    };
    if modified {
        title.push_str(" *");
    }
    title
}

/// Add `.txt` when the chosen name has no extension.
pub fn with_default_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("txt")
    }
}

pub fn about_features(autosave_secs: u64) -> Vec<String> {
    let autosave = if autosave_secs % 60 == 0 {
        let minutes = autosave_secs / 60;
        format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    } else {
        format!("{} seconds", autosave_secs)
    };
    vec![
        "1. Create, open, and save text files.".to_string(),
        "2. Customize background color.".to_string(),
        "3. Enable light/dark mode.".to_string(),
        "4. Spell check with suggestions.".to_string(),
        "5. Text formatting: bold, italic, and font size adjustment.".to_string(),
        format!("6. Undo/Redo, autosave every {}.", autosave),
        "7. Basic find and replace functionality.".to_string(),
        "8. Print the contents of the file.".to_string(),
    ]
}

fn text_format(style: CharStyle, base_size: f32, palette: Palette) -> TextFormat {
    let size = style.size.unwrap_or(base_size);
    let font_id = if style.bold { bold_font(size) } else { FontId::proportional(size) };
    let color = if style.misspelled {
        NoteColors::MISSPELLED
    } else if style.found {
        NoteColors::FOUND
    } else {
        palette.foreground
    };
    TextFormat {
        font_id,
        color,
        italics: style.italic,
        ..Default::default()
    }
}

/// Lay out `text` with one section per run of equally styled characters.
/// Characters beyond `styles` (typed this frame, not yet synced) are plain.
pub fn build_layout_job(text: &str, styles: &[CharStyle], base_size: f32, palette: Palette) -> LayoutJob {
    let mut job = LayoutJob::default();
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .collect();
    let runs = style_runs(styles, bounds.len() - 1);
    if runs.is_empty() {
        job.append("", 0.0, text_format(CharStyle::default(), base_size, palette));
    }
    for (range, style) in runs {
        job.append(
            &text[bounds[range.start]..bounds[range.end]],
            0.0,
            text_format(style, base_size, palette),
        );
    }
    job
}
