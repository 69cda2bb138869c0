use tokio::sync::watch;

/// Sign-in state supplied by the external identity platform.
pub trait IdentityProvider: Send + Sync {
    /// Stable identifier of the signed-in user, if any.
    fn current_user_id(&self) -> Option<String>;

    /// Receiver that observes every sign-in and sign-out.
    fn on_auth_change(&self) -> watch::Receiver<Option<String>>;
}

/// Identity held in-process and driven by explicit sign-in/sign-out calls.
#[derive(Debug)]
pub struct SessionIdentity {
    user: watch::Sender<Option<String>>,
}

impl SessionIdentity {
    pub fn signed_out() -> Self {
        let (user, _) = watch::channel(None);
        Self { user }
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        let (user, _) = watch::channel(Some(user_id.into()));
        Self { user }
    }

    pub fn sign_in(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        tracing::info!(user_id = %user_id, "User signed in");
        self.user.send_replace(Some(user_id));
    }

    pub fn sign_out(&self) {
        tracing::info!("User signed out");
        self.user.send_replace(None);
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.user.borrow().clone()
    }

    fn on_auth_change(&self) -> watch::Receiver<Option<String>> {
        self.user.subscribe()
    }
}
