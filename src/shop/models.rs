use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::shops;

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize)]
#[diesel(table_name = shops)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Shop {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub listing_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate, Debug, Insertable)]
#[diesel(table_name = shops)]
pub struct NewShop {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[validate(length(equal = 6, message = "pincode must have 6 digits"))]
    pub pincode: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub status: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    pub listing_url: Option<String>,
}

#[derive(Deserialize, Validate, Debug)]
pub struct UpdateShopPayload {
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[validate(length(equal = 6, message = "pincode must have 6 digits"))]
    pub pincode: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub status: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    pub listing_url: Option<String>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = shops)]
pub struct UpdateShop {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub listing_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<UpdateShopPayload> for UpdateShop {
    fn from(p: UpdateShopPayload) -> Self {
        Self {
            name: p.name,
            address: p.address,
            city: p.city,
            state: p.state,
            pincode: p.pincode,
            phone: p.phone,
            email: p.email,
            status: p.status,
            lat: p.lat,
            lng: p.lng,
            listing_url: p.listing_url,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ShopQuery {
    pub id: Option<i32>,
    pub status: Option<String>,
}
