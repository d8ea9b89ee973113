use crate::domain::model::Role;

/// The signed-in user, handed to the client explicitly instead of being
/// looked up from process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: access_token.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins and managers may read other users' commissions and schedules.
    pub fn can_view_team(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        let admin = Session::new("u1", "token", Role::Admin);
        let broker = Session::new("u2", "token", Role::Broker);
        assert!(admin.is_admin());
        assert!(admin.can_view_team());
        assert!(!broker.is_admin());
        assert!(!broker.can_view_team());
        assert!(Session::new("u3", "t", Role::Manager).can_view_team());
    }
}
