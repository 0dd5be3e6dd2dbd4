//! Listing records shown on the public page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::{error::AppError, types::ListingId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[schema(value_type = String)]
    pub id: ListingId,
    pub title: String,
    pub image_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Steam64 id of the admin who created the listing.
    pub owner_steam_id: String,
}

impl Listing {
    pub fn new(
        title: String,
        image_url: Option<String>,
        notes: Option<String>,
        owner_steam_id: String,
    ) -> Self {
        Self {
            id: ListingId::new(),
            title,
            image_url,
            notes,
            created_at: Utc::now(),
            owner_steam_id,
        }
    }
}

/// Body of `POST /api/listings`, accepted as JSON or as a urlencoded form.
///
/// Scalar JSON values are taken as their text form. Values are stored exactly
/// as sent; only a missing title is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingPayload {
    #[serde(default, deserialize_with = "truthy_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub notes: Option<String>,
}

impl CreateListingPayload {
    pub fn into_listing(self, owner_steam_id: &str) -> Result<Listing, AppError> {
        let title = self
            .title
            .filter(|title| !title.is_empty())
            .ok_or_else(|| AppError::BadRequest("Title required".into()))?;

        if owner_steam_id.is_empty() {
            return Err(AppError::BadRequest("Owner Steam id required".into()));
        }

        Ok(Listing::new(
            title,
            self.image_url,
            self.notes,
            owner_steam_id.to_string(),
        ))
    }
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(text_of)
}

/// Like [`scalar_text`], but `false` and zero count as no title.
fn truthy_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(false) => None,
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        other => text_of(other),
    })
}

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateListingResponse {
    pub ok: bool,
    pub item: Listing,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}
