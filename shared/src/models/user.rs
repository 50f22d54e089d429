//! User models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of an account, as returned by `/auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}
