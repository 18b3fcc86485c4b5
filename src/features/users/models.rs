use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Type, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Agent,
    Admin,
}
