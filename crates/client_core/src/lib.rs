//! Client core for the userdesk directory screen: remote directory access,
//! session gating, display ordering and the view-state controller.

pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod session;
pub mod sort;

pub use config::{load_settings, DirectorySettings};
pub use controller::{
    DirectoryController, EditDraft, EditField, Mount, Notice, NoticeSeverity, PageStep,
    RemoteCompletion, RemoteRequest, RequestTicket, ViewState,
};
pub use directory::{DirectoryService, HttpDirectoryService, MissingDirectoryService};
pub use error::{ClientSetupError, DirectoryAction, DirectoryError, SessionError};
pub use session::{
    FileSessionStore, GateDecision, MemorySessionStore, Route, SessionContext, SessionGate,
    SessionStore,
};
pub use sort::{sort_users, SortOption};

/// Executes `request` against `service` and packages the result for
/// [`DirectoryController::apply_completion`].
pub async fn perform(service: &dyn DirectoryService, request: RemoteRequest) -> RemoteCompletion {
    match request {
        RemoteRequest::ListUsers { ticket, page } => RemoteCompletion::UsersListed {
            ticket,
            page,
            result: service.list_users(page).await,
        },
        RemoteRequest::UpdateUser { ticket, id, fields } => {
            let result = service.update_user(id, &fields).await;
            RemoteCompletion::UserUpdated {
                ticket,
                id,
                fields,
                result,
            }
        }
        RemoteRequest::DeleteUser { ticket, id } => RemoteCompletion::UserDeleted {
            ticket,
            id,
            result: service.delete_user(id).await,
        },
    }
}

/// Performs `request` and applies it in one step, for callers that never have
/// more than one request outstanding.
pub async fn settle(
    controller: &mut DirectoryController,
    service: &dyn DirectoryService,
    request: RemoteRequest,
) -> Option<Notice> {
    let completion = perform(service, request).await;
    controller.apply_completion(completion)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
