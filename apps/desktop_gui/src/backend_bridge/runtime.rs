//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use anyhow::{Context, Result};
use client_core::{perform, DirectorySettings, HttpDirectoryService};
use crossbeam_channel::{Receiver, Sender};
use image::GenericImageView;
use reqwest::Client as HttpClient;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

const AVATAR_MAX_DIMENSION: u32 = 96;

/// Starts the worker thread. Each command runs as its own task, so
/// completions reach the UI in completion order rather than issue order.
pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: DirectorySettings) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build backend runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let service = match HttpDirectoryService::new(&settings) {
            Ok(service) => Arc::new(service),
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("invalid directory settings: {err}"),
                )));
                tracing::error!("invalid directory settings: {err}");
                return;
            }
        };
        let avatar_http = HttpClient::new();
        tracing::info!(base_url = %service.base_url(), "backend worker ready");
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

        while let Ok(cmd) = cmd_rx.recv() {
            let ui_tx = ui_tx.clone();
            match cmd {
                BackendCommand::Perform(request) => {
                    let service = Arc::clone(&service);
                    runtime.spawn(async move {
                        let completion = perform(service.as_ref(), request).await;
                        if ui_tx.send(UiEvent::Completed(completion)).is_err() {
                            tracing::debug!("ui event channel closed; dropping completion");
                        }
                    });
                }
                BackendCommand::FetchAvatar { user_id, url } => {
                    let http = avatar_http.clone();
                    runtime.spawn(async move {
                        let event = match fetch_avatar(&http, &url).await {
                            Ok(image) => UiEvent::AvatarLoaded {
                                user_id,
                                url,
                                image,
                            },
                            Err(err) => {
                                tracing::warn!(user_id = user_id.0, %url, "avatar fetch failed: {err:#}");
                                UiEvent::AvatarFailed {
                                    user_id,
                                    url,
                                    reason: format!("{err:#}"),
                                }
                            }
                        };
                        let _ = ui_tx.send(event);
                    });
                }
            }
        }
        tracing::info!("backend worker stopped");
    });
}

async fn fetch_avatar(http: &HttpClient, url: &str) -> Result<egui::ColorImage> {
    let bytes = http
        .get(url)
        .send()
        .await
        .context("failed to reach avatar host")?
        .error_for_status()
        .context("avatar host returned error")?
        .bytes()
        .await
        .context("failed to read avatar body")?;
    decode_avatar(&bytes)
}

fn decode_avatar(bytes: &[u8]) -> Result<egui::ColorImage> {
    let decoded = image::load_from_memory(bytes).context("unsupported avatar image")?;
    let (w, h) = decoded.dimensions();
    let resized = if w.max(h) > AVATAR_MAX_DIMENSION {
        decoded.thumbnail(AVATAR_MAX_DIMENSION, AVATAR_MAX_DIMENSION)
    } else {
        decoded
    };
    let rgba = resized.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
