//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`ShortLink`] - A shortened URL with expiry, click limit and password policy
//! - [`Click`] - A recorded redirect with best-effort geo attributes
//!
//! Creation inputs live next to their entity (`NewShortLink`, `NewClick`).

pub mod click;
pub mod link;

pub use click::{Click, NEUTRAL_FLAG, NewClick, UNKNOWN_COUNTRY};
pub use link::{NewShortLink, ShortLink};
