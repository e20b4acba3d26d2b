mod backend_bridge;
mod controller;
mod media;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{
    app::{memory_visitor_book, open_visitor_book},
    AppPaths, GuestbookApp, StartupConfig,
};

const WINDOW_TITLE: &str = "Buku Tamu Digital";

#[derive(Parser, Debug)]
struct Args {
    /// Directory holding the visitor store. Overrides `data_dir` from guestbook.toml.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let settings = client_core::load_settings();
    tracing::info!(?settings, "loaded settings");

    let startup = StartupConfig {
        data_dir: args.data_dir,
    };
    let paths = AppPaths::from_startup(&startup, &settings)?;
    let (book, startup_notice) = match open_visitor_book(&paths.data_root) {
        Ok(book) => (book, None),
        Err(err) => {
            tracing::error!(
                data_root = %paths.data_root.display(),
                "visitor store unavailable, keeping visits in memory: {err:#}"
            );
            (
                memory_visitor_book()?,
                Some(
                    "Penyimpanan lokal tidak tersedia. Data tamu hanya tersimpan sementara."
                        .to_string(),
                ),
            )
        }
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let _backend = backend_bridge::runtime::launch(settings.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([360.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            ui::theme::apply(&cc.egui_ctx);
            Ok(Box::new(GuestbookApp::new(
                &settings,
                paths,
                book,
                startup_notice,
                cmd_tx,
                ui_rx,
            )))
        }),
    )
    .map_err(|err| anyhow!("kiosk window failed: {err}"))
}
