use std::collections::HashMap;

use client_core::{
    DirectoryController, DirectoryError, DirectorySettings, EditField, Mount,
    Notice, NoticeSeverity, PageStep, RemoteCompletion, RemoteRequest, Route, SessionContext,
    SortOption,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::TextureHandle;
use shared::domain::{User, UserId};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

const CARD_WIDTH: f32 = 220.0;
const AVATAR_SIZE: f32 = 72.0;

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub settings: DirectorySettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppViewState {
    Entry,
    Users,
}

enum AvatarState {
    Loading,
    Ready(TextureHandle),
    Failed,
}

enum CardAction {
    Edit(UserId),
    Delete(UserId),
}

pub struct UserDeskApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    session: SessionContext,
    controller: DirectoryController,
    view_state: AppViewState,
    token_input: String,
    status: String,
    error_banner: Option<UiError>,
    notice: Option<Notice>,
    avatars: HashMap<String, AvatarState>,
}

impl UserDeskApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        session: SessionContext,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            controller: DirectoryController::new(session.clone()),
            session,
            view_state: AppViewState::Entry,
            token_input: String::new(),
            status: String::new(),
            error_banner: None,
            notice: None,
            avatars: HashMap::new(),
        };
        app.mount();
        app
    }

    fn mount(&mut self) {
        match self.controller.mount() {
            Mount::Redirect(route) => self.navigate(route),
            Mount::Ready(request) => {
                self.navigate(Route::Users);
                self.perform(request);
            }
        }
    }

    fn navigate(&mut self, route: Route) {
        self.view_state = match route {
            Route::Entry => AppViewState::Entry,
            Route::Users => AppViewState::Users,
        };
        self.notice = None;
        if route == Route::Entry {
            self.avatars.clear();
        }
    }

    fn perform(&mut self, request: RemoteRequest) {
        let fallback = request.clone();
        if let Err(status) =
            dispatch_backend_command(&self.cmd_tx, BackendCommand::Perform(request))
        {
            self.status = status.clone();
            // Settle the request locally so the screen does not wait forever.
            let completion = undispatched_completion(fallback, status);
            if let Some(notice) = self.controller.apply_completion(completion) {
                self.notice = Some(notice);
            }
        }
    }

    fn process_ui_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Completed(completion) => {
                    let listed = matches!(completion, RemoteCompletion::UsersListed { .. });
                    if let Some(notice) = self.controller.apply_completion(completion) {
                        self.notice = Some(notice);
                    }
                    if listed {
                        self.request_missing_avatars();
                    }
                }
                UiEvent::AvatarLoaded { url, image, .. } => {
                    let texture =
                        ctx.load_texture(format!("avatar:{url}"), image, egui::TextureOptions::LINEAR);
                    self.avatars.insert(url, AvatarState::Ready(texture));
                }
                UiEvent::AvatarFailed { user_id, url, reason } => {
                    tracing::debug!(user_id = user_id.0, "avatar unavailable: {reason}");
                    self.avatars.insert(url, AvatarState::Failed);
                }
                UiEvent::Error(err) => self.report_error(err),
            }
        }
    }

    fn report_error(&mut self, err: UiError) {
        tracing::error!(context = err.context().label(), "{}", err.message());
        self.status = err.to_string();
        self.error_banner = Some(err);
    }

    fn request_missing_avatars(&mut self) {
        let wanted: Vec<(UserId, String)> = self
            .controller
            .state()
            .users
            .iter()
            .filter(|user| is_fetchable_url(&user.avatar))
            .filter(|user| !self.avatars.contains_key(&user.avatar))
            .map(|user| (user.id, user.avatar.clone()))
            .collect();

        for (user_id, url) in wanted {
            self.avatars.insert(url.clone(), AvatarState::Loading);
            if let Err(status) =
                dispatch_backend_command(&self.cmd_tx, BackendCommand::FetchAvatar { user_id, url })
            {
                self.status = status;
            }
        }
    }

    fn sign_in(&mut self) {
        let token = self.token_input.trim().to_string();
        if token.is_empty() {
            return;
        }
        match self.session.sign_in(&token) {
            Ok(()) => {
                self.token_input.clear();
                self.error_banner = None;
                self.mount();
            }
            Err(err) => self.report_error(UiError::from_message(
                UiErrorContext::Session,
                format!("failed to save session: {err}"),
            )),
        }
    }

    fn logout(&mut self) {
        match self.controller.logout() {
            Ok(route) => {
                self.error_banner = None;
                self.navigate(route);
            }
            Err(err) => self.report_error(UiError::from_message(
                UiErrorContext::Session,
                format!("failed to clear session: {err}"),
            )),
        }
    }

    fn show_entry_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space((ui.available_height() * 0.2).clamp(18.0, 120.0));
            ui.vertical_centered(|ui| {
                ui.set_max_width(360.0);
                ui.heading("User Directory");
                ui.weak("Sign in with your session token.");
                ui.add_space(12.0);

                self.show_error_banner(ui);

                let response = ui.add_sized(
                    [ui.available_width(), 30.0],
                    egui::TextEdit::singleline(&mut self.token_input)
                        .hint_text("Token")
                        .password(true),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                ui.add_space(8.0);
                let can_submit = !self.token_input.trim().is_empty();
                if ui
                    .add_enabled(can_submit, egui::Button::new("Sign in"))
                    .clicked()
                    || (submitted && can_submit)
                {
                    self.sign_in();
                }

                if !self.status.is_empty() {
                    ui.add_space(8.0);
                    ui.small(&self.status);
                }
            });
        });
    }

    fn show_error_banner(&mut self, ui: &mut egui::Ui) {
        let Some(err) = &self.error_banner else {
            return;
        };
        let mut dismissed = false;
        egui::Frame::NONE
            .fill(ui.visuals().error_fg_color.gamma_multiply(0.15))
            .corner_radius(6.0)
            .inner_margin(egui::Margin::symmetric(10, 6))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(ui.visuals().error_fg_color, err.to_string());
                    if !err.is_fatal() && ui.small_button("Dismiss").clicked() {
                        dismissed = true;
                    }
                });
            });
        if dismissed {
            self.error_banner = None;
        }
    }

    fn show_users_screen(&mut self, ctx: &egui::Context) {
        let interactive = self.notice.is_none();

        egui::TopBottomPanel::top("directory_header").show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("User List");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Logout").clicked() {
                            self.logout();
                        }
                        self.show_sort_selector(ui);
                    });
                });
            });
        });

        egui::TopBottomPanel::bottom("directory_pagination").show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| {
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(self.controller.can_go_previous(), egui::Button::new("Prev"))
                        .clicked()
                    {
                        self.change_page(PageStep::Previous);
                    }
                    let state = self.controller.state();
                    ui.label(format!("Page {} of {}", state.page, state.total_pages));
                    if ui
                        .add_enabled(self.controller.can_go_next(), egui::Button::new("Next"))
                        .clicked()
                    {
                        self.change_page(PageStep::Next);
                    }
                    if !self.status.is_empty() {
                        ui.separator();
                        ui.weak(&self.status);
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_error_banner(ui);
            if self.controller.state().loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.weak("Loading...");
                });
                return;
            }

            let mut actions = Vec::new();
            ui.add_enabled_ui(interactive && self.controller.state().edit_draft.is_none(), |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.spacing_mut().item_spacing = egui::vec2(16.0, 16.0);
                        for user in self.controller.visible_users() {
                            if let Some(action) = show_user_card(ui, user, self.avatars.get(&user.avatar)) {
                                actions.push(action);
                            }
                        }
                    });
                });
            });

            for action in actions {
                match action {
                    CardAction::Edit(id) => {
                        self.controller.begin_edit(id);
                    }
                    CardAction::Delete(id) => {
                        let request = self.controller.delete_user(id);
                        self.perform(request);
                    }
                }
            }
        });

        self.show_edit_modal(ctx);
    }

    fn show_sort_selector(&mut self, ui: &mut egui::Ui) {
        let current = self.controller.state().sort_option;
        let mut selected = current;
        egui::ComboBox::from_id_salt("sort_option")
            .selected_text(selected.label())
            .show_ui(ui, |ui| {
                for option in SortOption::ALL {
                    ui.selectable_value(&mut selected, option, option.label());
                }
            });
        if selected != current {
            self.controller.set_sort_option(selected);
        }
    }

    fn change_page(&mut self, step: PageStep) {
        if let Some(request) = self.controller.change_page(step) {
            self.perform(request);
        }
    }

    fn show_edit_modal(&mut self, ctx: &egui::Context) {
        let Some(draft) = self.controller.state().edit_draft.clone() else {
            return;
        };
        let interactive = self.notice.is_none();
        let mut fields = draft.fields;
        let mut changed = Vec::new();
        let mut cancel = false;
        let mut submit = false;

        egui::Window::new("Edit User")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.add_enabled_ui(interactive, |ui| {
                    ui.set_width(320.0);
                    for (field, value, hint) in [
                        (EditField::FirstName, &mut fields.first_name, "First Name"),
                        (EditField::LastName, &mut fields.last_name, "Last Name"),
                        (EditField::Email, &mut fields.email, "Email"),
                    ] {
                        let response = ui.add(
                            egui::TextEdit::singleline(value)
                                .hint_text(hint)
                                .desired_width(f32::INFINITY),
                        );
                        if response.changed() {
                            changed.push((field, value.clone()));
                        }
                    }
                    ui.add_space(8.0);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        submit = ui.button("Update").clicked();
                        cancel = ui.button("Cancel").clicked();
                    });
                });
            });

        for (field, value) in changed {
            self.controller.update_edit_field(field, value);
        }
        if cancel {
            self.controller.cancel_edit();
        } else if submit {
            if let Some(request) = self.controller.commit_edit() {
                self.perform(request);
            }
        }
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = &self.notice else {
            return;
        };
        let mut acknowledged = false;
        let title = match notice.severity {
            NoticeSeverity::Success => "Done",
            NoticeSeverity::Failure => "Something went wrong",
        };
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 80.0))
            .show(ctx, |ui| {
                if notice.is_failure() {
                    ui.colored_label(ui.visuals().error_fg_color, &notice.message);
                } else {
                    ui.label(&notice.message);
                }
                ui.add_space(6.0);
                acknowledged = ui.button("OK").clicked()
                    || ui.input(|i| i.key_pressed(egui::Key::Enter));
            });
        if acknowledged {
            self.notice = None;
        }
    }
}

fn show_user_card(ui: &mut egui::Ui, user: &User, avatar: Option<&AvatarState>) -> Option<CardAction> {
    let mut action = None;
    egui::Frame::group(ui.style())
        .corner_radius(8.0)
        .inner_margin(egui::Margin::same(12))
        .show(ui, |ui| {
            ui.set_width(CARD_WIDTH);
            ui.vertical_centered(|ui| {
                match avatar {
                    Some(AvatarState::Ready(texture)) => {
                        ui.add(
                            egui::Image::new(texture)
                                .fit_to_exact_size(egui::vec2(AVATAR_SIZE, AVATAR_SIZE)),
                        );
                    }
                    Some(AvatarState::Loading) | Some(AvatarState::Failed) | None => {
                        avatar_placeholder(ui, &initials(user));
                    }
                }
                ui.add_space(6.0);
                ui.label(egui::RichText::new(user.full_name()).heading());
                ui.weak(&user.email);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Edit").clicked() {
                        action = Some(CardAction::Edit(user.id));
                    }
                    if ui.button("Delete").clicked() {
                        action = Some(CardAction::Delete(user.id));
                    }
                });
            });
        });
    action
}

fn avatar_placeholder(ui: &mut egui::Ui, text: &str) {
    let (rect, _) =
        ui.allocate_exact_size(egui::vec2(AVATAR_SIZE, AVATAR_SIZE), egui::Sense::hover());
    let visuals = ui.visuals();
    ui.painter()
        .circle_filled(rect.center(), AVATAR_SIZE / 2.0, visuals.faint_bg_color);
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(22.0),
        visuals.text_color(),
    );
}

fn initials(user: &User) -> String {
    [&user.first_name, &user.last_name]
        .iter()
        .filter_map(|name| name.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

fn is_fetchable_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Completion for a request that never reached the backend worker.
fn undispatched_completion(request: RemoteRequest, reason: String) -> RemoteCompletion {
    let action = request.action();
    let err = DirectoryError::new(action, reason);
    match request {
        RemoteRequest::ListUsers { ticket, page } => RemoteCompletion::UsersListed {
            ticket,
            page,
            result: Err(err),
        },
        RemoteRequest::UpdateUser { ticket, id, fields } => RemoteCompletion::UserUpdated {
            ticket,
            id,
            fields,
            result: Err(err),
        },
        RemoteRequest::DeleteUser { ticket, id } => RemoteCompletion::UserDeleted {
            ticket,
            id,
            result: Err(err),
        },
    }
}

impl eframe::App for UserDeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events(ctx);

        match self.view_state {
            AppViewState::Entry => self.show_entry_screen(ctx),
            AppViewState::Users => {
                self.show_users_screen(ctx);
                self.show_notice(ctx);
            }
        }

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use client_core::{DirectoryAction, MemorySessionStore, RequestTicket, SessionError, SessionStore};
    use shared::domain::UserFields;

    /// Reads succeed with a fixed token; every write fails.
    struct ReadOnlySession(Option<String>);

    impl SessionStore for ReadOnlySession {
        fn token(&self) -> Result<Option<String>, SessionError> {
            Ok(self.0.clone())
        }

        fn store_token(&self, _token: &str) -> Result<(), SessionError> {
            Err(SessionError::Poisoned)
        }

        fn clear_token(&self) -> Result<(), SessionError> {
            Err(SessionError::Poisoned)
        }
    }

    fn app_with(store: Arc<dyn SessionStore>) -> (UserDeskApp, Receiver<BackendCommand>) {
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(8);
        let (_ui_tx, ui_rx) = crossbeam_channel::bounded(8);
        let app = UserDeskApp::new(cmd_tx, ui_rx, SessionContext::new(store));
        (app, cmd_rx)
    }

    #[test]
    fn failed_sign_in_raises_session_banner() {
        let (mut app, _cmd_rx) = app_with(Arc::new(ReadOnlySession(None)));
        assert_eq!(app.view_state, AppViewState::Entry);

        app.token_input = "abc".to_string();
        app.sign_in();

        let banner = app.error_banner.as_ref().expect("session banner");
        assert_eq!(banner.context(), UiErrorContext::Session);
        assert!(banner.message().starts_with("failed to save session"));
        assert!(!banner.is_fatal());
        assert_eq!(app.view_state, AppViewState::Entry);
    }

    #[test]
    fn failed_logout_stays_on_users_screen_with_banner() {
        let (mut app, cmd_rx) = app_with(Arc::new(ReadOnlySession(Some("abc".to_string()))));
        assert_eq!(app.view_state, AppViewState::Users);
        assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::Perform(_))));

        app.logout();

        let banner = app.error_banner.as_ref().expect("session banner");
        assert_eq!(banner.context(), UiErrorContext::Session);
        assert!(banner.message().starts_with("failed to clear session"));
        assert_eq!(app.view_state, AppViewState::Users);
    }

    #[test]
    fn successful_sign_in_mounts_users_screen() {
        let (mut app, cmd_rx) = app_with(Arc::new(MemorySessionStore::default()));
        app.token_input = "abc".to_string();
        app.sign_in();

        assert!(app.error_banner.is_none());
        assert_eq!(app.view_state, AppViewState::Users);
        assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::Perform(_))));
    }

    fn user(first_name: &str, last_name: &str) -> User {
        User {
            id: UserId(1),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: "a@x.com".to_string(),
            avatar: "https://reqres.in/img/faces/1-image.jpg".to_string(),
        }
    }

    #[test]
    fn initials_use_first_letters_uppercased() {
        assert_eq!(initials(&user("ann", "Lee")), "AL");
        assert_eq!(initials(&user("Émile", "")), "É");
    }

    #[test]
    fn only_http_avatars_are_fetched() {
        assert!(is_fetchable_url("https://reqres.in/img/faces/1-image.jpg"));
        assert!(is_fetchable_url("http://127.0.0.1/u1.png"));
        assert!(!is_fetchable_url("u1.png"));
        assert!(!is_fetchable_url("data:image/png;base64,AAAA"));
    }

    #[test]
    fn undispatched_requests_settle_as_failures() {
        let completion = undispatched_completion(
            RemoteRequest::UpdateUser {
                ticket: RequestTicket(4),
                id: UserId(2),
                fields: UserFields::default(),
            },
            "queue full".to_string(),
        );
        match completion {
            RemoteCompletion::UserUpdated { ticket, id, result, .. } => {
                assert_eq!(ticket, RequestTicket(4));
                assert_eq!(id, UserId(2));
                let err = result.expect_err("failure");
                assert_eq!(err.action, DirectoryAction::UpdateUser);
                assert_eq!(err.detail, "queue full");
            }
            _ => panic!("unexpected completion kind"),
        }
    }
}
