use super::ClientError;

/// Whether the visitor has unlocked the upload/delete affordances.
///
/// Passed explicitly to whatever renders or mutates; it is a UI switch, not
/// an access control. The server enforces its own token when configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminSession {
    #[default]
    Guest,
    Admin,
}

impl AdminSession {
    pub fn login(self) -> Self {
        AdminSession::Admin
    }

    pub fn logout(self) -> Self {
        AdminSession::Guest
    }

    pub fn is_admin(self) -> bool {
        self == AdminSession::Admin
    }

    pub fn require_admin(self) -> Result<(), ClientError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ClientError::NotAdmin)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_and_logout_toggle_admin() {
        let session = AdminSession::default();
        assert!(!session.is_admin());
        assert!(matches!(session.require_admin(), Err(ClientError::NotAdmin)));

        let session = session.login();
        assert!(session.is_admin());
        assert!(session.require_admin().is_ok());
        assert_eq!(session.logout(), AdminSession::Guest);
    }
}
