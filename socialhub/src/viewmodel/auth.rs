use tokio::sync::watch;

use crate::error::Result;
use crate::services::Services;
use socialhub_types::AuthSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUiState {
    pub is_logged_in: bool,
    pub status_text: String,
}

impl From<&AuthSession> for AuthUiState {
    fn from(session: &AuthSession) -> Self {
        let status_text = if !session.is_logged_in {
            "Status: Not signed in".to_string()
        } else {
            match (session.name.as_deref(), session.email.as_deref()) {
                (Some(name), Some(email)) => format!("Status: Signed in as {} ({})", name, email),
                (Some(name), None) => format!("Status: Signed in as {}", name),
                (None, Some(email)) => format!("Status: Signed in as {}", email),
                (None, None) => "Status: Signed in".to_string(),
            }
        };

        Self {
            is_logged_in: session.is_logged_in,
            status_text,
        }
    }
}

/// Sign-in status line for the identity provider session
pub struct AuthViewModel {
    services: Services,
    session: watch::Receiver<AuthSession>,
}

impl AuthViewModel {
    pub fn new(services: Services) -> Self {
        let session = services.auth_session.subscribe();
        Self { services, session }
    }

    pub fn ui_state(&self) -> AuthUiState {
        AuthUiState::from(&*self.session.borrow())
    }

    /// Wait for the session to change. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<AuthUiState> {
        self.session.changed().await.ok()?;
        Some(AuthUiState::from(&*self.session.borrow_and_update()))
    }

    /// Record what the identity provider returned after sign-in
    pub fn on_signed_in(&self, name: Option<&str>, email: Option<&str>) -> Result<()> {
        self.services.auth_session.set_logged_in(name, email)?;
        Ok(())
    }

    pub fn sign_out(&self) -> Result<()> {
        self.services.auth_session.clear()?;
        Ok(())
    }
}
