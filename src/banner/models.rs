use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::banners;

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize)]
#[diesel(table_name = banners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Banner {
    pub id: i32,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate, Insertable, Debug)]
#[diesel(table_name = banners)]
pub struct NewBanner {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    pub subtitle: Option<String>,
    #[validate(length(min = 1, message = "image_url is required"))]
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Deserialize, Validate, Debug)]
pub struct UpdateBannerPayload {
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[validate(length(min = 1))]
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = banners)]
pub struct UpdateBanner {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

impl UpdateBanner {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.subtitle.is_none()
            && self.image_url.is_none()
            && self.link_url.is_none()
            && self.sort_order.is_none()
            && self.active.is_none()
    }
}

impl From<UpdateBannerPayload> for UpdateBanner {
    fn from(p: UpdateBannerPayload) -> Self {
        Self {
            title: p.title,
            subtitle: p.subtitle,
            image_url: p.image_url,
            link_url: p.link_url,
            sort_order: p.sort_order,
            active: p.active,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct BannerQuery {
    pub id: Option<i32>,
    pub all: Option<String>,
}

impl BannerQuery {
    pub fn include_inactive(&self) -> bool {
        matches!(self.all.as_deref(), Some("1" | "true"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_flag_accepts_one_or_true() {
        let q = |all: &str| BannerQuery {
            id: None,
            all: Some(all.to_owned()),
        };
        assert!(q("1").include_inactive());
        assert!(q("true").include_inactive());
        assert!(!q("0").include_inactive());
        assert!(!BannerQuery::default().include_inactive());
    }

    #[test]
    fn empty_update_is_detected() {
        let payload: UpdateBannerPayload = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert!(UpdateBanner::from(payload).is_empty());

        let payload: UpdateBannerPayload =
            serde_json::from_str(r#"{"id": 3, "active": false}"#).unwrap();
        assert!(!UpdateBanner::from(payload).is_empty());
    }
}
