//! Backend commands queued from UI to backend worker.

use client_core::RemoteRequest;
use shared::domain::UserId;

pub enum BackendCommand {
    Perform(RemoteRequest),
    FetchAvatar { user_id: UserId, url: String },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Perform(request) => request.action().as_str(),
            BackendCommand::FetchAvatar { .. } => "fetch_avatar",
        }
    }
}
