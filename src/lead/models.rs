use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::relay::RelayReport;
use crate::{
    schema::leads,
    utils::{
        AppError,
        validate::{non_empty, normalize_indian_mobile},
    },
};

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize, Clone)]
#[diesel(table_name = leads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Lead {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub city: Option<String>,
    pub vehicle_number: Option<String>,
    pub product: Option<String>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = leads)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub city: Option<String>,
    pub vehicle_number: Option<String>,
    pub product: Option<String>,
    pub notes: Option<String>,
    pub source: Option<String>,
}

/// Body shared by the buy, recharge, KYC update, blacklist removal, tag
/// replacement and dispute forms.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeadRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub city: Option<String>,
    #[serde(alias = "vehicle_number", alias = "vehicle")]
    pub vehicle_number: Option<String>,
    pub product: Option<String>,
    #[serde(alias = "message")]
    pub notes: Option<String>,
    #[serde(alias = "service")]
    pub source: Option<String>,
}

impl LeadRequest {
    pub fn into_new(self) -> Result<NewLead, AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_owned()));
        }

        let phone = normalize_indian_mobile(&self.phone).ok_or_else(|| {
            AppError::Validation("Enter a valid 10-digit mobile number".to_owned())
        })?;

        Ok(NewLead {
            name: name.to_owned(),
            phone,
            city: non_empty(self.city),
            vehicle_number: non_empty(self.vehicle_number).map(|v| v.to_uppercase()),
            product: non_empty(self.product),
            notes: non_empty(self.notes),
            source: non_empty(self.source),
        })
    }
}

#[derive(Serialize, Debug)]
pub struct LeadResponse {
    pub success: bool,
    pub id: i32,
    pub debug: RelayReport,
}
