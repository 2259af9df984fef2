use crate::db::{Collection, Database, USERS};
use crate::error::{StoreError, ValidationError};
use crate::models::{SignUpInput, User};
use crate::session::Session;

// Built-in administrator, checked before any registered user.
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Credential checks against the built-in admin and the registered-user file.
/// Passwords are stored and compared as plain text.
#[derive(Clone)]
pub struct Auth {
    users: Collection<User>,
}

impl Auth {
    pub fn new(db: &Database) -> Self {
        Auth {
            users: db.collection(USERS),
        }
    }

    pub fn login(&self, session: &mut Session, username: &str, password: &str) -> Result<(), StoreError> {
        let known = (username == ADMIN_USERNAME && password == ADMIN_PASSWORD)
            || self
                .users
                .load()
                .iter()
                .any(|u| u.username == username && u.password == password);
        if !known {
            log::info!("failed login for {:?}", username);
            return Err(StoreError::InvalidCredentials);
        }

        session.logged_in = true;
        session.username = Some(username.to_string());
        log::info!("{} logged in", username);
        Ok(())
    }

    pub fn logout(session: &mut Session) {
        session.logged_in = false;
        session.username = None;
    }

    /// Fields are trimmed before any check; usernames compare case-sensitively.
    pub fn register(&self, input: SignUpInput) -> Result<User, StoreError> {
        let field = |value: Option<String>| value.map(|v| v.trim().to_string()).unwrap_or_default();
        let username = field(input.username);
        let password = field(input.password);
        let confirm_password = field(input.confirm_password);

        if username.is_empty() || password.is_empty() || confirm_password.is_empty() {
            return Err(ValidationError::MissingRegistrationFields.into());
        }
        if password != confirm_password {
            return Err(ValidationError::PasswordMismatch.into());
        }

        let user = self.users.update(|users| {
            if users.iter().any(|u| u.username == username) {
                return Err(ValidationError::UsernameTaken.into());
            }
            let user = User { username, password };
            users.push(user.clone());
            Ok(user)
        })?;
        log::info!("registered user {}", user.username);
        Ok(user)
    }

    pub fn require_login(session: &Session) -> bool {
        session.logged_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sign_up(username: &str, password: &str, confirm: &str) -> SignUpInput {
        SignUpInput {
            username: Some(username.into()),
            password: Some(password.into()),
            confirm_password: Some(confirm.into()),
        }
    }

    fn auth(dir: &TempDir) -> Auth {
        Auth::new(&Database::open(dir.path()))
    }

    #[test]
    fn admin_pair_logs_in() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::default();
        auth(&dir).login(&mut session, "admin", "admin123").unwrap();
        assert!(Auth::require_login(&session));
        assert_eq!(session.username.as_deref(), Some("admin"));
    }

    #[test]
    fn registered_user_logs_in_only_with_exact_pair() {
        let dir = TempDir::new().unwrap();
        let auth = auth(&dir);
        auth.register(sign_up("alice", "s3cret", "s3cret")).unwrap();

        let mut session = Session::default();
        assert!(matches!(
            auth.login(&mut session, "alice", "S3CRET"),
            Err(StoreError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login(&mut session, "admin", "s3cret"),
            Err(StoreError::InvalidCredentials)
        ));
        assert!(!Auth::require_login(&session));

        auth.login(&mut session, "alice", "s3cret").unwrap();
        assert_eq!(session.username.as_deref(), Some("alice"));
    }

    #[test]
    fn logout_clears_identity() {
        let dir = TempDir::new().unwrap();
        let mut session = Session {
            cart: vec![1],
            ..Session::default()
        };
        auth(&dir).login(&mut session, "admin", "admin123").unwrap();

        Auth::logout(&mut session);

        assert!(!Auth::require_login(&session));
        assert_eq!(session.username, None);
        assert_eq!(session.cart, vec![1]);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let dir = TempDir::new().unwrap();
        let auth = auth(&dir);
        auth.register(sign_up("bob", "pw", "pw")).unwrap();

        let err = auth.register(sign_up("bob", "other", "other")).unwrap_err();

        assert!(matches!(err, StoreError::Validation(ValidationError::UsernameTaken)));
        assert_eq!(auth.users.load().len(), 1);
    }

    #[test]
    fn usernames_are_case_sensitive() {
        let dir = TempDir::new().unwrap();
        let auth = auth(&dir);
        auth.register(sign_up("bob", "pw", "pw")).unwrap();
        auth.register(sign_up("Bob", "pw", "pw")).unwrap();
        assert_eq!(auth.users.load().len(), 2);
    }

    #[test]
    fn mismatched_passwords_are_rejected() {
        let dir = TempDir::new().unwrap();
        let err = auth(&dir).register(sign_up("carol", "a", "b")).unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match.");
    }

    #[test]
    fn blank_fields_are_rejected() {
        let dir = TempDir::new().unwrap();
        let auth = auth(&dir);
        let err = auth.register(sign_up("   ", "pw", "pw")).unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all fields.");

        let err = auth.register(SignUpInput::default()).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::MissingRegistrationFields)));
    }

    #[test]
    fn registration_trims_fields() {
        let dir = TempDir::new().unwrap();
        let user = auth(&dir).register(sign_up(" dave ", " pw ", "pw")).unwrap();
        assert_eq!(user.username, "dave");
        assert_eq!(user.password, "pw");
    }
}
