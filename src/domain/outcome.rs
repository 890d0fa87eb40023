//! Redirect resolution outcomes.

/// The decision produced for a short code.
///
/// [`crate::application::services::ResolutionService::resolve`] yields
/// `Redirect`, `RedirectToPasswordPrompt`, `NotFound`, `Expired` or `Exhausted`.
/// [`crate::application::services::ResolutionService::resolve_protected`] yields
/// `Redirect`, `WrongPassword`, `NotProtected`, `NotFound`, `Expired` or `Exhausted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Redirect { destination: String },
    RedirectToPasswordPrompt,
    NotFound,
    Expired,
    Exhausted,
    WrongPassword,
    NotProtected,
}

impl Outcome {
    /// Stable label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Redirect { .. } => "redirect",
            Outcome::RedirectToPasswordPrompt => "password_prompt",
            Outcome::NotFound => "not_found",
            Outcome::Expired => "expired",
            Outcome::Exhausted => "exhausted",
            Outcome::WrongPassword => "wrong_password",
            Outcome::NotProtected => "not_protected",
        }
    }
}
