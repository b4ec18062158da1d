use eframe::NativeOptions;
use notecore::NoteTheme;
use notepad::config::Settings;
use notepad::{logging, NotepadApp};

fn main() -> eframe::Result<()> {
    logging::init();
    let initial_file = std::env::args().nth(1).map(std::path::PathBuf::from);
    let settings = Settings::load();

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([800.0, 600.0])
        .with_title("Notepad")
        .with_drag_and_drop(true);

    let options = NativeOptions {
        viewport,
        ..Default::default()
    };
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting notepad");
    eframe::run_native("Notepad", options, Box::new(move |cc| {
        NoteTheme::install_fonts(&cc.egui_ctx);
        NoteTheme::default().with_dark(settings.dark_mode).apply(&cc.egui_ctx);
        let mut app = NotepadApp::new(cc, settings);
        if let Some(path) = initial_file {
            if path.is_file() {
                app.open_file(path);
            } else {
                tracing::warn!(path = %path.display(), "argument is not a file, ignored");
            }
        }
        Box::new(app)
    }))
}
