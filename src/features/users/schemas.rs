use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public projection of a listing owner. Credential columns are never selected
/// into this type.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OwnerOut {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub picture: Option<String>,
}
