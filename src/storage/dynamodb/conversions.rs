//! Conversions between DynamoDB items and the domain records.
//!
//! This is the only place that knows the attribute layout. Attribute names
//! are PascalCase; timestamps are RFC 3339 strings.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::countries::repo_types::CountryFavorite;
use crate::storage::{RepositoryError, Result};
use crate::weather::repo_types::WeatherFavorite;

pub type Item = HashMap<String, AttributeValue>;

pub const ID: &str = "Id";
pub const EMAIL: &str = "Email";
pub const USER_ID: &str = "UserId";

/// A record that can be stored as a single DynamoDB item.
pub trait DynamoRecord: Sized {
    fn to_item(&self) -> Result<Item>;
    fn from_item(item: &Item) -> Result<Self>;
}

impl DynamoRecord for User {
    fn to_item(&self) -> Result<Item> {
        let mut item = Item::new();
        put_s(&mut item, ID, self.id.to_string());
        put_s(&mut item, EMAIL, self.email.clone());
        put_s(&mut item, "PasswordHash", self.password_hash.clone());
        put_s(&mut item, "FirstName", self.first_name.clone());
        put_s(&mut item, "LastName", self.last_name.clone());
        put_s(&mut item, "CreatedAt", format_datetime(self.created_at)?);
        if let Some(updated_at) = self.updated_at {
            put_s(&mut item, "UpdatedAt", format_datetime(updated_at)?);
        }
        item.insert("IsActive".to_string(), AttributeValue::Bool(self.is_active));
        Ok(item)
    }

    fn from_item(item: &Item) -> Result<Self> {
        Ok(Self {
            id: get_uuid(item, ID)?,
            email: get_string(item, EMAIL)?,
            password_hash: get_string(item, "PasswordHash")?,
            first_name: get_string(item, "FirstName")?,
            last_name: get_string(item, "LastName")?,
            created_at: get_datetime(item, "CreatedAt")?,
            updated_at: get_optional_datetime(item, "UpdatedAt")?,
            // Items written before the flag existed count as active.
            is_active: get_optional_bool(item, "IsActive")?.unwrap_or(true),
        })
    }
}

impl DynamoRecord for WeatherFavorite {
    fn to_item(&self) -> Result<Item> {
        let mut item = Item::new();
        put_s(&mut item, ID, self.id.to_string());
        put_s(&mut item, USER_ID, self.user_id.to_string());
        put_s(&mut item, "CityName", self.city_name.clone());
        put_s(&mut item, "CountryCode", self.country_code.clone());
        if let Some(lat) = self.latitude {
            item.insert("Latitude".to_string(), AttributeValue::N(lat.to_string()));
        }
        if let Some(lon) = self.longitude {
            item.insert("Longitude".to_string(), AttributeValue::N(lon.to_string()));
        }
        put_s(&mut item, "AddedAt", format_datetime(self.added_at)?);
        Ok(item)
    }

    fn from_item(item: &Item) -> Result<Self> {
        Ok(Self {
            id: get_uuid(item, ID)?,
            user_id: get_uuid(item, USER_ID)?,
            city_name: get_string(item, "CityName")?,
            country_code: get_string(item, "CountryCode")?,
            latitude: get_optional_f64(item, "Latitude")?,
            longitude: get_optional_f64(item, "Longitude")?,
            added_at: get_datetime(item, "AddedAt")?,
        })
    }
}

impl DynamoRecord for CountryFavorite {
    fn to_item(&self) -> Result<Item> {
        let mut item = Item::new();
        put_s(&mut item, ID, self.id.to_string());
        put_s(&mut item, USER_ID, self.user_id.to_string());
        put_s(&mut item, "CountryCode", self.country_code.clone());
        put_s(&mut item, "CountryName", self.country_name.clone());
        put_s(&mut item, "Region", self.region.clone());
        put_s(&mut item, "AddedAt", format_datetime(self.added_at)?);
        Ok(item)
    }

    fn from_item(item: &Item) -> Result<Self> {
        Ok(Self {
            id: get_uuid(item, ID)?,
            user_id: get_uuid(item, USER_ID)?,
            country_code: get_string(item, "CountryCode")?,
            country_name: get_string(item, "CountryName")?,
            region: get_optional_string(item, "Region")?.unwrap_or_default(),
            added_at: get_datetime(item, "AddedAt")?,
        })
    }
}

fn put_s(item: &mut Item, key: &str, value: String) {
    item.insert(key.to_string(), AttributeValue::S(value));
}

fn format_datetime(value: OffsetDateTime) -> Result<String> {
    value
        .format(&Rfc3339)
        .map_err(|e| RepositoryError::Malformed(format!("cannot format timestamp: {e}")))
}

fn get_optional_string(item: &Item, key: &str) -> Result<Option<String>> {
    match item.get(key) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(AttributeValue::S(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RepositoryError::Malformed(format!(
            "attribute '{key}' is not a string"
        ))),
    }
}

fn get_string(item: &Item, key: &str) -> Result<String> {
    get_optional_string(item, key)?
        .ok_or_else(|| RepositoryError::Malformed(format!("missing attribute '{key}'")))
}

fn get_uuid(item: &Item, key: &str) -> Result<Uuid> {
    let raw = get_string(item, key)?;
    Uuid::parse_str(&raw)
        .map_err(|e| RepositoryError::Malformed(format!("attribute '{key}' is not a uuid: {e}")))
}

fn get_datetime(item: &Item, key: &str) -> Result<OffsetDateTime> {
    get_optional_datetime(item, key)?
        .ok_or_else(|| RepositoryError::Malformed(format!("missing attribute '{key}'")))
}

fn get_optional_datetime(item: &Item, key: &str) -> Result<Option<OffsetDateTime>> {
    get_optional_string(item, key)?
        .map(|raw| {
            OffsetDateTime::parse(&raw, &Rfc3339).map_err(|e| {
                RepositoryError::Malformed(format!("attribute '{key}' is not RFC 3339: {e}"))
            })
        })
        .transpose()
}

fn get_optional_f64(item: &Item, key: &str) -> Result<Option<f64>> {
    match item.get(key) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(AttributeValue::N(n)) => n.parse::<f64>().map(Some).map_err(|e| {
            RepositoryError::Malformed(format!("attribute '{key}' is not a number: {e}"))
        }),
        Some(_) => Err(RepositoryError::Malformed(format!(
            "attribute '{key}' is not a number"
        ))),
    }
}

fn get_optional_bool(item: &Item, key: &str) -> Result<Option<bool>> {
    match item.get(key) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(AttributeValue::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(RepositoryError::Malformed(format!(
            "attribute '{key}' is not a boolean"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_item_keeps_every_field() {
        let mut user = User::new("Ana@Example.com", "$argon2id$stub".into(), "Ana", "Souza");
        user.updated_at = Some(user.created_at);
        let item = user.to_item().unwrap();

        assert_eq!(item.get(EMAIL), Some(&AttributeValue::S("ana@example.com".into())));
        assert_eq!(item.get("IsActive"), Some(&AttributeValue::Bool(true)));

        let back = User::from_item(&item).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn weather_favorite_omits_missing_coordinates() {
        let fav = WeatherFavorite::new(Uuid::new_v4(), "Paris", "FR", None, Some(2.35));
        let item = fav.to_item().unwrap();
        assert!(!item.contains_key("Latitude"));
        assert_eq!(item.get("Longitude"), Some(&AttributeValue::N("2.35".into())));
        assert_eq!(WeatherFavorite::from_item(&item).unwrap(), fav);
    }

    #[test]
    fn legacy_user_without_active_flag_is_active() {
        let user = User::new("old@x.com", "h".into(), "Old", "Timer");
        let mut item = user.to_item().unwrap();
        item.remove("IsActive");
        assert!(User::from_item(&item).unwrap().is_active);
    }

    #[test]
    fn malformed_items_are_rejected() {
        let fav = CountryFavorite::new(Uuid::new_v4(), "BR", "Brasil", "Americas");
        let mut item = fav.to_item().unwrap();
        item.insert(USER_ID.to_string(), AttributeValue::S("not-a-uuid".into()));
        assert!(matches!(
            CountryFavorite::from_item(&item),
            Err(RepositoryError::Malformed(_))
        ));

        item.remove(USER_ID);
        assert!(CountryFavorite::from_item(&item).is_err());
    }
}
