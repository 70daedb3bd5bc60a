use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::favorites::Favorite;

/// A country saved by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryFavorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub country_code: String,
    pub country_name: String,
    pub region: String,
    #[serde(with = "time::serde::rfc3339")]
    pub added_at: OffsetDateTime,
}

impl CountryFavorite {
    pub fn new(
        user_id: Uuid,
        country_code: impl Into<String>,
        country_name: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            country_code: country_code.into().trim().to_uppercase(),
            country_name: country_name.into().trim().to_string(),
            region: region.into().trim().to_string(),
            added_at: OffsetDateTime::now_utc(),
        }
    }
}

impl Favorite for CountryFavorite {
    const KIND: &'static str = "CountryFavorite";

    fn id(&self) -> Uuid {
        self.id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn added_at(&self) -> OffsetDateTime {
        self.added_at
    }

    fn same_key(&self, other: &Self) -> bool {
        self.country_code.eq_ignore_ascii_case(&other.country_code)
    }
}
