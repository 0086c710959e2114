//! UI/backend events and error modeling for desktop GUI controller.

use client_core::RemoteCompletion;
use shared::domain::UserId;

pub enum UiEvent {
    Info(String),
    Completed(RemoteCompletion),
    AvatarLoaded {
        user_id: UserId,
        url: String,
        image: egui::ColorImage,
    },
    AvatarFailed {
        user_id: UserId,
        url: String,
        reason: String,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Session,
}

impl UiErrorContext {
    pub fn label(self) -> &'static str {
        match self {
            UiErrorContext::BackendStartup => "Backend",
            UiErrorContext::Session => "Session",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            context,
            message: message.into(),
        }
    }

    /// Worker startup failures leave nothing to retry against.
    pub fn is_fatal(&self) -> bool {
        self.context == UiErrorContext::BackendStartup
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for UiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context.label(), self.message)
    }
}
