use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, settle, DirectoryController, DirectoryService, DirectorySettings, EditField,
    FileSessionStore, HttpDirectoryService, Mount, Notice, SessionContext, SortOption,
};
use shared::domain::UserId;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "userdesk", about = "Browse and manage directory users")]
struct Args {
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    api_key: Option<String>,
    /// Per-request timeout; 0 disables it.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Persist a session token.
    Login {
        #[arg(long)]
        token: String,
    },
    /// Forget the persisted session token.
    Logout,
    /// Show one page of users.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// firstNameAsc, firstNameDesc, lastNameAsc or lastNameDesc.
        #[arg(long, default_value = "")]
        sort: String,
    },
    /// Edit a user listed on the given page.
    Edit {
        #[arg(long)]
        id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete a user.
    Delete {
        #[arg(long)]
        id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

impl Args {
    fn settings(&self) -> DirectorySettings {
        let mut settings = load_settings();
        if let Some(v) = &self.base_url {
            settings.base_url = v.clone();
        }
        if let Some(v) = &self.api_key {
            settings.api_key = Some(v.clone());
        }
        if let Some(v) = self.timeout_secs {
            settings.request_timeout = (v > 0).then(|| Duration::from_secs(v));
        }
        if let Some(v) = &self.session_file {
            settings.session_file = v.clone();
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let args = Args::parse();
    let settings = args.settings();

    let session = SessionContext::new(Arc::new(FileSessionStore::new(&settings.session_file)));
    let service = HttpDirectoryService::new(&settings).context("invalid directory settings")?;
    let mut controller = DirectoryController::new(session.clone());

    match args.command {
        Command::Login { token } => {
            session
                .sign_in(&token)
                .context("failed to persist session token")?;
            println!("Signed in.");
        }
        Command::Logout => {
            controller
                .logout()
                .context("failed to clear session token")?;
            println!("Signed out.");
        }
        Command::List { page, sort } => {
            open_page(&mut controller, &service, page).await?;
            controller.set_sort_option(SortOption::parse(&sort));
            print_page(&controller);
        }
        Command::Edit {
            id,
            page,
            first_name,
            last_name,
            email,
        } => {
            open_page(&mut controller, &service, page).await?;
            let id = UserId(id);
            if !controller.begin_edit(id) {
                bail!("user {id} is not listed on page {page}");
            }
            for (field, value) in [
                (EditField::FirstName, first_name),
                (EditField::LastName, last_name),
                (EditField::Email, email),
            ] {
                if let Some(value) = value {
                    controller.update_edit_field(field, value);
                }
            }
            if let Some(request) = controller.commit_edit() {
                report(settle(&mut controller, &service, request).await)?;
            }
            print_page(&controller);
        }
        Command::Delete { id, page } => {
            open_page(&mut controller, &service, page).await?;
            let request = controller.delete_user(UserId(id));
            report(settle(&mut controller, &service, request).await)?;
            print_page(&controller);
        }
    }

    Ok(())
}

/// Mounts the controller, then jumps straight to `page` once the first load
/// has reported how many pages exist.
async fn open_page(
    controller: &mut DirectoryController,
    service: &dyn DirectoryService,
    page: u32,
) -> Result<()> {
    let request = match controller.mount() {
        Mount::Redirect(_) => {
            bail!("not signed in; run `userdesk login --token <token>` first")
        }
        Mount::Ready(request) => request,
    };
    report(settle(controller, service, request).await)?;

    if page <= 1 {
        return Ok(());
    }
    let total_pages = controller.state().total_pages;
    if page > total_pages {
        bail!("page {page} is out of range (total pages: {total_pages})");
    }
    let request = controller.load_page(page);
    report(settle(controller, service, request).await)
}

fn report(notice: Option<Notice>) -> Result<()> {
    match notice {
        Some(notice) if notice.is_failure() => bail!("{}", notice.message),
        Some(notice) => {
            println!("{}", notice.message);
            Ok(())
        }
        None => Ok(()),
    }
}

fn print_page(controller: &DirectoryController) {
    let state = controller.state();
    if state.sort_option != SortOption::None {
        println!("Sorted by {}", state.sort_option.label());
    }
    for user in controller.visible_users() {
        println!(
            "#{:<4} {:<28} {:<32} {}",
            user.id,
            user.full_name(),
            user.email,
            user.avatar
        );
    }
    println!(
        "Page {}/{}{}{}",
        state.page,
        state.total_pages,
        if controller.can_go_previous() { "  [prev]" } else { "" },
        if controller.can_go_next() { "  [next]" } else { "" },
    );
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
