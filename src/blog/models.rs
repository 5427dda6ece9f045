use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    schema::blogs,
    utils::validate::{non_empty, slugify},
};

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize)]
#[diesel(table_name = blogs)]
#[diesel(primary_key(slug))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Blog {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub doc_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate, Debug)]
pub struct CreateBlogPayload {
    #[validate(length(max = 200))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 300, message = "title is required"))]
    pub title: String,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    #[validate(length(max = 100))]
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub doc_url: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = blogs)]
pub struct NewBlog {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub doc_url: Option<String>,
    pub video_url: Option<String>,
}

impl CreateBlogPayload {
    /// Slug as given (normalised), or derived from the title when omitted.
    pub fn into_new(self) -> Option<NewBlog> {
        let slug = match non_empty(self.slug) {
            Some(slug) => slugify(&slug),
            None => slugify(&self.title),
        };

        if slug.is_empty() {
            return None;
        }

        Some(NewBlog {
            slug,
            title: self.title.trim().to_owned(),
            excerpt: non_empty(self.excerpt),
            content: self.content,
            author: non_empty(self.author),
            image_url: non_empty(self.image_url),
            doc_url: non_empty(self.doc_url),
            video_url: non_empty(self.video_url),
        })
    }
}

#[derive(Deserialize, Validate, Debug)]
pub struct UpdateBlogPayload {
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    #[validate(length(max = 100))]
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub doc_url: Option<String>,
    pub video_url: Option<String>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = blogs)]
pub struct UpdateBlog {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub doc_url: Option<String>,
    pub video_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UpdateBlogPayload {
    /// Changeset for the fields that were sent; `None` when the body changes nothing.
    pub fn into_changes(self) -> Option<UpdateBlog> {
        let untouched = self.title.is_none()
            && self.excerpt.is_none()
            && self.content.is_none()
            && self.author.is_none()
            && self.image_url.is_none()
            && self.doc_url.is_none()
            && self.video_url.is_none();

        if untouched {
            return None;
        }

        Some(UpdateBlog {
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            author: self.author,
            image_url: self.image_url,
            doc_url: self.doc_url,
            video_url: self.video_url,
            updated_at: Utc::now(),
        })
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct BlogQuery {
    pub slug: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> CreateBlogPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn slug_is_derived_from_title_when_missing() {
        let blog = payload(r#"{"title": "FASTag KYC: What Changed in 2024"}"#)
            .into_new()
            .unwrap();
        assert_eq!(blog.slug, "fastag-kyc-what-changed-in-2024");
        assert_eq!(blog.content, "");
    }

    #[test]
    fn explicit_slug_is_normalised() {
        let blog = payload(r#"{"slug": "Blacklist Removal", "title": "t"}"#)
            .into_new()
            .unwrap();
        assert_eq!(blog.slug, "blacklist-removal");
    }

    #[test]
    fn title_without_slug_characters_is_rejected() {
        assert!(payload(r#"{"title": "???"}"#).into_new().is_none());
    }

    #[test]
    fn empty_update_has_no_changeset() {
        let update: UpdateBlogPayload = serde_json::from_str(r#"{"slug": "x"}"#).unwrap();
        assert!(update.into_changes().is_none());

        let update: UpdateBlogPayload = serde_json::from_str(r#"{"excerpt": "short"}"#).unwrap();
        let changes = update.into_changes().unwrap();
        assert_eq!(changes.excerpt.as_deref(), Some("short"));
        assert!(changes.title.is_none());
    }
}
