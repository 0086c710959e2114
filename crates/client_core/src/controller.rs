//! View-state controller for the user directory screen.
//!
//! The controller performs no I/O. Operations that need the remote directory
//! return a [`RemoteRequest`]; whoever owns the transport executes it (see
//! [`crate::perform`]) and hands the resulting [`RemoteCompletion`] back to
//! [`DirectoryController::apply_completion`]. Completions may arrive in any
//! order; page loads are tagged so only the latest one is applied.

use shared::{
    domain::{User, UserFields, UserId},
    protocol::UserPage,
};
use tracing::{debug, error, info};

use crate::{
    error::{DirectoryAction, DirectoryError, SessionError},
    session::{GateDecision, Route, SessionContext, SessionGate},
    sort::{sort_users, SortOption},
};

/// Correlates a completion with the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    ListUsers {
        ticket: RequestTicket,
        page: u32,
    },
    UpdateUser {
        ticket: RequestTicket,
        id: UserId,
        fields: UserFields,
    },
    DeleteUser {
        ticket: RequestTicket,
        id: UserId,
    },
}

impl RemoteRequest {
    pub fn ticket(&self) -> RequestTicket {
        match self {
            Self::ListUsers { ticket, .. }
            | Self::UpdateUser { ticket, .. }
            | Self::DeleteUser { ticket, .. } => *ticket,
        }
    }

    pub fn action(&self) -> DirectoryAction {
        match self {
            Self::ListUsers { .. } => DirectoryAction::LoadUsers,
            Self::UpdateUser { .. } => DirectoryAction::UpdateUser,
            Self::DeleteUser { .. } => DirectoryAction::DeleteUser,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCompletion {
    UsersListed {
        ticket: RequestTicket,
        page: u32,
        result: Result<UserPage, DirectoryError>,
    },
    UserUpdated {
        ticket: RequestTicket,
        id: UserId,
        fields: UserFields,
        result: Result<(), DirectoryError>,
    },
    UserDeleted {
        ticket: RequestTicket,
        id: UserId,
        result: Result<(), DirectoryError>,
    },
}

impl RemoteCompletion {
    pub fn ticket(&self) -> RequestTicket {
        match self {
            Self::UsersListed { ticket, .. }
            | Self::UserUpdated { ticket, .. }
            | Self::UserDeleted { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Success,
    Failure,
}

/// Outcome the presentation layer should surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub action: DirectoryAction,
    pub message: String,
}

impl Notice {
    pub fn failure(action: DirectoryAction) -> Self {
        Self {
            severity: NoticeSeverity::Failure,
            action,
            message: action.failure_message().to_string(),
        }
    }

    fn success(action: DirectoryAction) -> Option<Self> {
        action.success_message().map(|message| Self {
            severity: NoticeSeverity::Success,
            action,
            message: message.to_string(),
        })
    }

    pub fn is_failure(&self) -> bool {
        self.severity == NoticeSeverity::Failure
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    FirstName,
    LastName,
    Email,
}

impl EditField {
    /// Accepts the wire field names (`first_name`, `last_name`, `email`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "first_name" => Some(Self::FirstName),
            "last_name" => Some(Self::LastName),
            "email" => Some(Self::Email),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub user_id: UserId,
    pub fields: UserFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mount {
    Redirect(Route),
    Ready(RemoteRequest),
}

/// Snapshot of what the screen displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Current page only, in fetch order.
    pub users: Vec<User>,
    /// 1-indexed.
    pub page: u32,
    pub total_pages: u32,
    pub sort_option: SortOption,
    pub loading: bool,
    pub edit_draft: Option<EditDraft>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            page: 1,
            total_pages: 1,
            sort_option: SortOption::None,
            loading: false,
            edit_draft: None,
        }
    }
}

#[derive(Debug)]
pub struct DirectoryController {
    session: SessionContext,
    state: ViewState,
    next_ticket: u64,
    latest_load: Option<RequestTicket>,
    /// Oldest ticket issued for the current view; anything older belongs to a
    /// view torn down by `mount` or `logout`.
    view_floor: RequestTicket,
}

impl DirectoryController {
    pub fn new(session: SessionContext) -> Self {
        Self {
            session,
            state: ViewState::default(),
            next_ticket: 1,
            latest_load: None,
            view_floor: RequestTicket(1),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Runs the session gate and, when it passes, starts loading page 1.
    pub fn mount(&mut self) -> Mount {
        self.reset();
        match SessionGate::check(&self.session) {
            GateDecision::Redirect(route) => Mount::Redirect(route),
            GateDecision::Proceed => Mount::Ready(self.load_page(1)),
        }
    }

    fn reset(&mut self) {
        self.state = ViewState::default();
        self.latest_load = None;
        self.view_floor = RequestTicket(self.next_ticket);
    }

    fn issue_ticket(&mut self) -> RequestTicket {
        let ticket = RequestTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    /// Targets `page` and supersedes any page load still outstanding.
    pub fn load_page(&mut self, page: u32) -> RemoteRequest {
        let page = page.max(1);
        let ticket = self.issue_ticket();
        self.state.page = page;
        self.state.loading = true;
        self.latest_load = Some(ticket);
        debug!(ticket = ticket.0, page, "page load issued");
        RemoteRequest::ListUsers { ticket, page }
    }

    pub fn can_go_previous(&self) -> bool {
        self.state.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.state.page < self.state.total_pages
    }

    /// Moves one page; a step past either bound is a no-op.
    pub fn change_page(&mut self, step: PageStep) -> Option<RemoteRequest> {
        let target = match step {
            PageStep::Previous if self.can_go_previous() => self.state.page - 1,
            PageStep::Next if self.can_go_next() => self.state.page + 1,
            _ => return None,
        };
        Some(self.load_page(target))
    }

    pub fn set_sort_option(&mut self, option: SortOption) {
        self.state.sort_option = option;
    }

    /// Users in display order.
    pub fn visible_users(&self) -> Vec<&User> {
        sort_users(&self.state.users, self.state.sort_option)
    }

    /// Opens (or replaces) the draft for `id`. Returns false if `id` is not on
    /// the current page.
    pub fn begin_edit(&mut self, id: UserId) -> bool {
        let Some(user) = self.state.users.iter().find(|user| user.id == id) else {
            return false;
        };
        self.state.edit_draft = Some(EditDraft {
            user_id: id,
            fields: user.editable_fields(),
        });
        true
    }

    /// Returns false when no draft is open.
    pub fn update_edit_field(&mut self, field: EditField, value: impl Into<String>) -> bool {
        let Some(draft) = self.state.edit_draft.as_mut() else {
            return false;
        };
        let slot = match field {
            EditField::FirstName => &mut draft.fields.first_name,
            EditField::LastName => &mut draft.fields.last_name,
            EditField::Email => &mut draft.fields.email,
        };
        *slot = value.into();
        true
    }

    /// Submits the open draft. The draft stays open until the update succeeds.
    pub fn commit_edit(&mut self) -> Option<RemoteRequest> {
        let draft = self.state.edit_draft.clone()?;
        let ticket = self.issue_ticket();
        Some(RemoteRequest::UpdateUser {
            ticket,
            id: draft.user_id,
            fields: draft.fields,
        })
    }

    pub fn cancel_edit(&mut self) {
        self.state.edit_draft = None;
    }

    /// Issued even when `id` is not on the current page.
    pub fn delete_user(&mut self, id: UserId) -> RemoteRequest {
        let ticket = self.issue_ticket();
        RemoteRequest::DeleteUser { ticket, id }
    }

    /// Clears the persisted token and returns the route to navigate to.
    pub fn logout(&mut self) -> Result<Route, SessionError> {
        self.session.clear()?;
        self.reset();
        info!("signed out");
        Ok(Route::Entry)
    }

    pub fn apply_completion(&mut self, completion: RemoteCompletion) -> Option<Notice> {
        let ticket = completion.ticket();
        if ticket < self.view_floor {
            debug!(
                ticket = ticket.0,
                view_floor = self.view_floor.0,
                "discarding completion from a previous view"
            );
            return None;
        }
        match completion {
            RemoteCompletion::UsersListed {
                ticket,
                page,
                result,
            } => self.apply_page(ticket, page, result),
            RemoteCompletion::UserUpdated {
                ticket,
                id,
                fields,
                result,
            } => self.apply_update(ticket, id, fields, result),
            RemoteCompletion::UserDeleted { ticket, id, result } => {
                self.apply_delete(ticket, id, result)
            }
        }
    }

    fn apply_page(
        &mut self,
        ticket: RequestTicket,
        page: u32,
        result: Result<UserPage, DirectoryError>,
    ) -> Option<Notice> {
        if self.latest_load != Some(ticket) {
            debug!(
                ticket = ticket.0,
                page,
                current_page = self.state.page,
                "discarding stale page response"
            );
            return None;
        }
        self.latest_load = None;
        self.state.loading = false;

        match result {
            Ok(user_page) => {
                info!(
                    page,
                    users = user_page.data.len(),
                    total_pages = user_page.total_pages,
                    "page loaded"
                );
                self.state.users = user_page.data;
                self.state.total_pages = user_page.total_pages.max(1);
                let draft_still_visible = self.state.edit_draft.as_ref().map(|draft| {
                    self.state
                        .users
                        .iter()
                        .any(|user| user.id == draft.user_id)
                });
                if draft_still_visible == Some(false) {
                    self.state.edit_draft = None;
                }
                None
            }
            Err(err) => {
                error!(page, "error fetching users: {err}");
                Some(Notice::failure(DirectoryAction::LoadUsers))
            }
        }
    }

    fn apply_update(
        &mut self,
        ticket: RequestTicket,
        id: UserId,
        fields: UserFields,
        result: Result<(), DirectoryError>,
    ) -> Option<Notice> {
        if let Err(err) = result {
            error!(ticket = ticket.0, user_id = id.0, "error updating user: {err}");
            return Some(Notice::failure(DirectoryAction::UpdateUser));
        }

        if let Some(user) = self.state.users.iter_mut().find(|user| user.id == id) {
            user.merge_fields(&fields);
        }
        if self
            .state
            .edit_draft
            .as_ref()
            .is_some_and(|draft| draft.user_id == id)
        {
            self.state.edit_draft = None;
        }
        info!(ticket = ticket.0, user_id = id.0, "user updated");
        Notice::success(DirectoryAction::UpdateUser)
    }

    fn apply_delete(
        &mut self,
        ticket: RequestTicket,
        id: UserId,
        result: Result<(), DirectoryError>,
    ) -> Option<Notice> {
        if let Err(err) = result {
            error!(ticket = ticket.0, user_id = id.0, "error deleting user: {err}");
            return Some(Notice::failure(DirectoryAction::DeleteUser));
        }

        // total_pages is left as is until the next page load.
        self.state.users.retain(|user| user.id != id);
        if self
            .state
            .edit_draft
            .as_ref()
            .is_some_and(|draft| draft.user_id == id)
        {
            self.state.edit_draft = None;
        }
        info!(ticket = ticket.0, user_id = id.0, "user deleted");
        Notice::success(DirectoryAction::DeleteUser)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
