//! Click entity representing a single recorded redirect.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Country name recorded when the geo lookup fails or is skipped.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Flag recorded when the country cannot be determined.
pub const NEUTRAL_FLAG: &str = "🏳️";

/// A click recorded when a short link redirect was served.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: Uuid,
    pub short_link_id: Uuid,
    pub country: String,
    pub flag: String,
    pub clicked_at: DateTime<Utc>,
}

/// Input data for recording a click.
///
/// `short_link_id` should reference a live link, but a click racing a
/// concurrent deletion may be rejected or orphaned; both are tolerated.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub short_link_id: Uuid,
    pub country: String,
    pub flag: String,
    pub clicked_at: DateTime<Utc>,
}

impl NewClick {
    pub fn into_click(self, id: Uuid) -> Click {
        Click {
            id,
            short_link_id: self.short_link_id,
            country: self.country,
            flag: self.flag,
            clicked_at: self.clicked_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_click_into_click() {
        let link_id = Uuid::new_v4();
        let now = Utc::now();
        let click = NewClick {
            short_link_id: link_id,
            country: UNKNOWN_COUNTRY.to_string(),
            flag: NEUTRAL_FLAG.to_string(),
            clicked_at: now,
        }
        .into_click(Uuid::new_v4());

        assert_eq!(click.short_link_id, link_id);
        assert_eq!(click.country, "Unknown");
        assert_eq!(click.clicked_at, now);
    }
}
