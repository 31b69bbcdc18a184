#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    // Log to stderr; `RUST_LOG=bucket_paint=debug` shows fill decisions.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 780.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Bucket Paint",
        native_options,
        Box::new(|cc| Ok(Box::new(bucket_paint::PaintApp::new(cc)))),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {}
