mod backend_bridge;
mod controller;
mod ui;

use std::{path::PathBuf, sync::Arc, time::Duration};

use backend_bridge::commands::BackendCommand;
use clap::Parser;
use client_core::{load_settings, FileSessionStore, SessionContext};
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use ui::{StartupConfig, UserDeskApp};

#[derive(Parser, Debug)]
#[command(name = "userdesk-gui", about = "Desktop user directory")]
struct Args {
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    /// Per-request timeout; 0 disables it.
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long)]
    session_file: Option<PathBuf>,
}

impl Args {
    fn startup_config(self) -> StartupConfig {
        let mut settings = load_settings();
        if let Some(v) = self.base_url {
            settings.base_url = v;
        }
        if let Some(v) = self.api_key {
            settings.api_key = Some(v);
        }
        if let Some(v) = self.timeout_secs {
            settings.request_timeout = (v > 0).then(|| Duration::from_secs(v));
        }
        if let Some(v) = self.session_file {
            settings.session_file = v;
        }
        StartupConfig { settings }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let startup = Args::parse().startup_config();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, startup.settings.clone());

    let session = SessionContext::new(Arc::new(FileSessionStore::new(
        &startup.settings.session_file,
    )));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("User Directory")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([520.0, 420.0]),
        ..Default::default()
    };
    eframe::run_native(
        "userdesk",
        options,
        Box::new(move |_cc| Ok(Box::new(UserDeskApp::new(cmd_tx, ui_rx, session)))),
    )
}
