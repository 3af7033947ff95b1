use homies_auth::Principal;
use homies_core::UserId;

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware; every protected handler extracts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> &UserId {
        self.principal.user_id()
    }

    pub fn user_name(&self) -> &str {
        self.principal.user_name()
    }
}
