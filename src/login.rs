use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub const FORM_USER: &str = "User";
pub const PROVIDER_USER: &str = "Google User";
pub const PROVIDER_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginState {
    #[default]
    Closed,
    Open,
    Pending,
    Authenticated { name: String },
}

impl LoginState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginState::Authenticated { .. })
    }
}

/// Whatever the user typed. Never checked.
#[derive(Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("sign-in cancelled")]
    Cancelled,
    #[error("sign-in rejected: {0}")]
    Rejected(String),
}

pub type SignInFuture = Pin<Box<dyn Future<Output = Result<String, SignInError>> + Send>>;

/// Third-party sign-in. Resolves to the display name of the signed-in user.
pub trait IdentityProvider {
    fn sign_in(&self, cancel: CancellationToken) -> SignInFuture;
}

/// Stand-in provider: waits a fixed delay, then succeeds.
#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    pub delay: Duration,
    pub display_name: String,
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self {
            delay: PROVIDER_DELAY,
            display_name: PROVIDER_USER.to_string(),
        }
    }
}

impl IdentityProvider for SimulatedProvider {
    fn sign_in(&self, cancel: CancellationToken) -> SignInFuture {
        let delay = self.delay;
        let name = self.display_name.clone();
        Box::pin(async move {
            tokio::select! {
                _ = cancel.cancelled() => Err(SignInError::Cancelled),
                _ = tokio::time::sleep(delay) => Ok(name),
            }
        })
    }
}

/// Transition requests the modal understands.
#[derive(Debug, Clone)]
pub enum LoginEvent {
    Open,
    Close,
    Submit(LoginForm),
    BeginProvider,
    ProviderSucceeded(String),
    ProviderFailed,
}

/// Pure transition function. `None` means the event does not apply in
/// `state` and should be ignored.
pub fn transition(state: &LoginState, event: &LoginEvent) -> Option<LoginState> {
    use LoginState::*;

    match (state, event) {
        (Authenticated { .. }, _) => None,
        (Closed | Open, LoginEvent::Open) => Some(Open),
        (Open, LoginEvent::Close) => Some(Closed),
        // The modal can be shown or dismissed while the exchange runs; the
        // exchange itself keeps going.
        (Pending, LoginEvent::Open | LoginEvent::Close) => Some(Pending),
        (Open, LoginEvent::Submit(_)) => Some(Authenticated {
            name: FORM_USER.to_string(),
        }),
        (Open, LoginEvent::BeginProvider) => Some(Pending),
        (Pending, LoginEvent::ProviderSucceeded(name)) => {
            Some(Authenticated { name: name.clone() })
        }
        (Pending, LoginEvent::ProviderFailed) => Some(Open),
        _ => None,
    }
}
