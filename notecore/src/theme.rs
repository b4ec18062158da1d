//! Notepad theme: light and dark modes
//!
//! The window chrome follows egui's light or dark visuals. The text area
//! has its own `Palette` so the background colour can be changed
//! independently of the mode.

use egui::{Color32, FontData, FontDefinitions, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};
use std::path::PathBuf;

/// Font family used for bold runs. Always defined once fonts are installed;
/// falls back to the proportional fonts when no bold face is found.
pub const BOLD_FAMILY: &str = "bold";

/// Fixed colours used by the editor.
pub struct NoteColors;

impl NoteColors {
    pub const WHITE: Color32 = Color32::from_rgb(255, 255, 255);
    pub const BLACK: Color32 = Color32::from_rgb(0, 0, 0);
    /// Text area background in dark mode.
    pub const DARK_BG: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
    /// Foreground of find matches.
    pub const FOUND: Color32 = Color32::from_rgb(0, 0, 255);
    /// Foreground of misspelled words.
    pub const MISSPELLED: Color32 = Color32::from_rgb(255, 0, 0);
}

/// Colours of the text area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color32,
    pub foreground: Color32,
    pub cursor: Color32,
}

impl Palette {
    pub fn light() -> Self {
        Self {
            background: NoteColors::WHITE,
            foreground: NoteColors::BLACK,
            cursor: NoteColors::BLACK,
        }
    }

    pub fn dark() -> Self {
        Self {
            background: NoteColors::DARK_BG,
            foreground: NoteColors::WHITE,
            cursor: NoteColors::WHITE,
        }
    }

    pub fn for_mode(dark: bool) -> Self {
        if dark { Self::dark() } else { Self::light() }
    }

    /// Same palette with a different background.
    pub fn with_background(mut self, background: Color32) -> Self {
        self.background = background;
        self
    }
}

/// Theme configuration for the editor window
pub struct NoteTheme {
    pub font_size_body: f32,
    pub font_size_heading: f32,
    pub font_size_small: f32,
    pub window_padding: f32,
    pub item_spacing: f32,
    pub dark: bool,
}

impl Default for NoteTheme {
    fn default() -> Self {
        Self {
            font_size_body: 14.0,
            font_size_heading: 20.0,
            font_size_small: 11.0,
            window_padding: 8.0,
            item_spacing: 4.0,
            dark: false,
        }
    }
}

impl NoteTheme {
    pub fn with_dark(mut self, dark: bool) -> Self {
        self.dark = dark;
        self
    }

    /// Find a bold sans face on disk (searched relative to exe and standard paths).
    fn load_bold_font() -> Option<Vec<u8>> {
        let mut search_paths = Vec::new();

        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                search_paths.push(dir.join("fonts").join("Bold.ttf"));
            }
        }
        for path in [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
            "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
            "C:\\Windows\\Fonts\\arialbd.ttf",
        ] {
            search_paths.push(PathBuf::from(path));
        }

        for path in search_paths {
            if let Ok(data) = std::fs::read(&path) {
                tracing::debug!(path = %path.display(), "loaded bold font");
                return Some(data);
            }
        }
        tracing::info!("no bold font found, bold text uses the regular face");
        None
    }

    /// Register the fonts, including the `BOLD_FAMILY` family. Call once.
    pub fn install_fonts(ctx: &egui::Context) {
        let mut fonts = FontDefinitions::default();
        let mut bold = Vec::new();
        if let Some(data) = Self::load_bold_font() {
            fonts.font_data.insert("NotepadBold".to_owned(), FontData::from_owned(data));
            bold.push("NotepadBold".to_owned());
        }
        if let Some(regular) = fonts.families.get(&FontFamily::Proportional) {
            bold.extend(regular.iter().cloned());
        }
        fonts.families.insert(FontFamily::Name(BOLD_FAMILY.into()), bold);
        ctx.set_fonts(fonts);
    }

    /// Apply the theme to an egui context
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = Style::default();

        style.text_styles = [
            (TextStyle::Small, FontId::new(self.font_size_small, FontFamily::Proportional)),
            (TextStyle::Body, FontId::new(self.font_size_body, FontFamily::Proportional)),
            (TextStyle::Button, FontId::new(self.font_size_body, FontFamily::Proportional)),
            (TextStyle::Heading, FontId::new(self.font_size_heading, FontFamily::Proportional)),
            (TextStyle::Monospace, FontId::new(self.font_size_body, FontFamily::Monospace)),
        ]
        .into();

        let mut visuals = if self.dark { Visuals::dark() } else { Visuals::light() };
        let palette = Palette::for_mode(self.dark);

        visuals.window_rounding = Rounding::same(2.0);
        visuals.menu_rounding = Rounding::same(2.0);
        visuals.extreme_bg_color = palette.background;
        visuals.window_stroke = Stroke::new(1.0, palette.foreground.gamma_multiply(0.5));

        style.visuals = visuals;
        style.spacing.window_margin = egui::Margin::same(self.window_padding);
        style.spacing.item_spacing = egui::vec2(self.item_spacing, self.item_spacing);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);

        ctx.set_style(style);
    }
}

/// Font for bold text at `size` points.
pub fn bold_font(size: f32) -> FontId {
    FontId::new(size, FontFamily::Name(BOLD_FAMILY.into()))
}

/// Parse `#RRGGBB` (leading `#` optional, case-insensitive).
pub fn parse_hex(s: &str) -> Option<Color32> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}

/// Format a colour as `#RRGGBB`; alpha is dropped.
pub fn to_hex(c: Color32) -> String {
    format!("#{:02X}{:02X}{:02X}", c.r(), c.g(), c.b())
}

/// Menu bar styling helper
pub fn menu_bar<R>(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> egui::InnerResponse<R> {
    let stroke = ui.visuals().widgets.noninteractive.bg_stroke;
    let frame_resp = egui::Frame::none()
        .fill(ui.visuals().panel_fill)
        .stroke(stroke)
        .inner_margin(egui::Margin::symmetric(4.0, 2.0))
        .show(ui, |ui| {
            egui::menu::bar(ui, add_contents).inner
        });
    egui::InnerResponse {
        inner: frame_resp.inner,
        response: frame_resp.response,
    }
}

/// Strip Cmd+/Cmd- zoom keys so they never rescale the UI.
/// Call this at the start of the app's update().
pub fn consume_zoom_keys(ctx: &egui::Context) {
    ctx.input_mut(|i| {
        i.events.retain(|event| !matches!(event,
            egui::Event::Key { key, modifiers, .. }
                if modifiers.command && matches!(key, egui::Key::Plus | egui::Key::Minus | egui::Key::Equals)
        ));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#333333"), Some(NoteColors::DARK_BG));
        assert_eq!(parse_hex("ffffff"), Some(NoteColors::WHITE));
        assert_eq!(parse_hex("#FfFfFf"), Some(NoteColors::WHITE));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
        assert_eq!(parse_hex("#ééé"), None);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(NoteColors::DARK_BG), "#333333");
        assert_eq!(to_hex(Color32::from_rgb(1, 171, 255)), "#01ABFF");
        assert_eq!(parse_hex(&to_hex(NoteColors::FOUND)), Some(NoteColors::FOUND));
    }

    #[test]
    fn test_palettes() {
        let dark = Palette::dark();
        assert_eq!(dark.background, NoteColors::DARK_BG);
        assert_eq!(dark.foreground, NoteColors::WHITE);
        assert_eq!(Palette::for_mode(false), Palette::light());
        let tinted = Palette::light().with_background(NoteColors::FOUND);
        assert_eq!(tinted.background, NoteColors::FOUND);
        assert_eq!(tinted.foreground, NoteColors::BLACK);
    }
}
