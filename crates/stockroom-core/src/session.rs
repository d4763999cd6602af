//! # Session
//!
//! The authenticated user, handed back by login and passed explicitly to
//! every use case. There is no global "current user".
//!
//! ```text
//!   authenticate(email, password) ──► Session ──► add_product(&state, &session, ..)
//!                                          │
//!                                          └────► history.user_id = session.user_id
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{Role, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub role: Role,
    #[ts(as = "String")]
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: &User) -> Self {
        Session {
            user_id: user.id.clone(),
            name: user.name.clone(),
            surname: user.surname.clone(),
            email: user.email.clone(),
            role: user.role,
            started_at: Utc::now(),
        }
    }

    pub fn is_user(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Rejects actions a user may not perform on their own account.
    pub fn ensure_not_self(&self, target_user_id: &str) -> CoreResult<()> {
        if self.is_user(target_user_id) {
            return Err(CoreError::Unauthorized(
                "you cannot delete your own account".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewUser;

    fn admin() -> User {
        NewUser {
            name: "Admin".to_string(),
            surname: "Root".to_string(),
            email: "admin@stockroom.local".to_string(),
            role: Role::Admin,
            password: "pw".to_string(),
        }
        .into_user()
    }

    #[test]
    fn test_session_copies_identity() {
        let user = admin();
        let session = Session::new(&user);
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.role, Role::Admin);
        assert!(session.is_user(&user.id));
    }

    #[test]
    fn test_self_deletion_rejected() {
        let user = admin();
        let session = Session::new(&user);

        assert!(matches!(
            session.ensure_not_self(&user.id),
            Err(CoreError::Unauthorized(_))
        ));
        assert!(session.ensure_not_self("someone-else").is_ok());
    }
}
