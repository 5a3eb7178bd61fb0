use clap::Parser;
use client::{
    app::TrilhaApp,
    config::{Args, Config},
};
use eframe::egui;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let args = Args::parse();
    let config = Config::from_args(args)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Trilha")
            .with_inner_size([420.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Trilha",
        options,
        Box::new(|cc| {
            let app = TrilhaApp::new(config, cc.egui_ctx.clone())?;

            let interrupt = app.interrupt();
            let ctx = cc.egui_ctx.clone();
            ctrlc::set_handler(move || interrupt.raise(&ctx))?;

            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Board window failed: {e}"))
}
