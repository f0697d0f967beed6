//! Session capabilities injected into [`crate::SearchClient`].
//!
//! The client never owns credentials. The host shell hands it a way to read
//! the current token and a way to ask the user to sign in.

/// Supplies the bearer token to attach to each request, if any.
pub trait TokenProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn current_token(&self) -> Option<String> {
        self()
    }
}

/// Invoked when the backend answers 401 so the shell can show its login flow.
pub trait LoginPrompt: Send + Sync {
    fn request_login(&self);
}

impl<F> LoginPrompt for F
where
    F: Fn() + Send + Sync,
{
    fn request_login(&self) {
        self();
    }
}
