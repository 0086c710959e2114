use serde::{Deserialize, Serialize};

use crate::domain::{User, UserFields};

/// Body of `GET /users?page={n}`.
///
/// The service sends more pagination metadata (`page`, `per_page`, `total`)
/// but only `data` and `total_pages` are relied upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPage {
    pub data: Vec<User>,
    pub total_pages: u32,
}

/// Body of `PUT /users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<UserFields> for UpdateUserRequest {
    fn from(value: UserFields) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
        }
    }
}

impl From<UpdateUserRequest> for UserFields {
    fn from(value: UpdateUserRequest) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
        }
    }
}
