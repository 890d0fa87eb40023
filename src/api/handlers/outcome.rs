//! Translation of resolution outcomes into HTTP errors.

use serde_json::json;

use crate::domain::outcome::Outcome;
use crate::error::AppError;

/// Maps a non-redirect outcome to the error the client sees.
///
/// Exhausted links answer like missing ones; only expiry is reported as `410 Gone`.
pub fn outcome_error(code: &str, outcome: &Outcome) -> AppError {
    match outcome {
        Outcome::Expired => AppError::gone("Short link has expired", json!({ "code": code })),
        Outcome::WrongPassword => {
            AppError::unauthorized("Incorrect password", json!({ "code": code }))
        }
        Outcome::NotProtected => AppError::bad_request(
            "Short link is not password protected",
            json!({ "code": code }),
        ),
        Outcome::NotFound | Outcome::Exhausted => {
            AppError::not_found("Short link not found", json!({ "code": code }))
        }
        Outcome::Redirect { .. } | Outcome::RedirectToPasswordPrompt => AppError::internal(
            "Unexpected redirect outcome",
            json!({ "outcome": outcome.label() }),
        ),
    }
}
