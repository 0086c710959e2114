use std::sync::Arc;

use async_trait::async_trait;
use client_core::{DirectoryError, MemorySessionStore};
use shared::{
    domain::{User, UserFields, UserId},
    protocol::UserPage,
};
use tokio::sync::Mutex;

use super::*;

#[derive(Default)]
struct RecordingDirectory {
    total_pages: u32,
    requested_pages: Mutex<Vec<u32>>,
}

impl RecordingDirectory {
    fn with_pages(total_pages: u32) -> Self {
        Self {
            total_pages,
            ..Self::default()
        }
    }
}

#[async_trait]
impl DirectoryService for RecordingDirectory {
    async fn list_users(&self, page: u32) -> Result<UserPage, DirectoryError> {
        self.requested_pages.lock().await.push(page);
        let id = i64::from(page) * 10;
        Ok(UserPage {
            data: vec![User {
                id: UserId(id),
                first_name: format!("Page{page}"),
                last_name: "User".to_string(),
                email: format!("user{id}@example.com"),
                avatar: format!("u{id}.png"),
            }],
            total_pages: self.total_pages,
        })
    }

    async fn update_user(&self, _id: UserId, _fields: &UserFields) -> Result<(), DirectoryError> {
        Ok(())
    }

    async fn delete_user(&self, _id: UserId) -> Result<(), DirectoryError> {
        Ok(())
    }
}

fn signed_in_controller() -> DirectoryController {
    DirectoryController::new(SessionContext::new(Arc::new(
        MemorySessionStore::with_token("token"),
    )))
}

#[tokio::test]
async fn open_page_loads_target_page_without_walking() {
    let service = RecordingDirectory::with_pages(12);
    let mut controller = signed_in_controller();

    open_page(&mut controller, &service, 9).await.expect("open page 9");

    assert_eq!(*service.requested_pages.lock().await, vec![1, 9]);
    assert_eq!(controller.state().page, 9);
    assert_eq!(controller.state().users[0].id, UserId(90));
}

#[tokio::test]
async fn open_first_page_issues_a_single_request() {
    let service = RecordingDirectory::with_pages(3);
    let mut controller = signed_in_controller();

    open_page(&mut controller, &service, 1).await.expect("open page 1");

    assert_eq!(*service.requested_pages.lock().await, vec![1]);
}

#[tokio::test]
async fn open_page_past_the_end_fails_after_first_load() {
    let service = RecordingDirectory::with_pages(2);
    let mut controller = signed_in_controller();

    let err = open_page(&mut controller, &service, 5)
        .await
        .expect_err("out of range");

    assert!(err.to_string().contains("total pages: 2"), "{err}");
    assert_eq!(*service.requested_pages.lock().await, vec![1]);
}

#[tokio::test]
async fn open_page_requires_a_session() {
    let service = RecordingDirectory::with_pages(2);
    let mut controller =
        DirectoryController::new(SessionContext::new(Arc::new(MemorySessionStore::default())));

    let err = open_page(&mut controller, &service, 1)
        .await
        .expect_err("signed out");

    assert!(err.to_string().contains("not signed in"), "{err}");
    assert!(service.requested_pages.lock().await.is_empty());
}
