use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A stored user. Also serves as the resolved identity of an authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// bcrypt hash; never sent back to clients.
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
}

/// Row to insert when registering.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub hashed_password: String,
}

/// Profile fields editable through `PUT /users/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}
