use serde::{Deserialize, Serialize};

use homies_core::UserId;

/// An authenticated caller, as resolved from the identity provider.
///
/// `user_id` is the stable key used everywhere in the domain; `user_name` is
/// only shown to other users (organiser column, participant lists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    user_id: UserId,
    user_name: String,
}

impl Principal {
    pub fn new(user_id: UserId, user_name: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }
}
