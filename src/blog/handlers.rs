use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use diesel::{
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
};
use diesel_async::RunQueryDsl;
use tracing::info;

use super::models::{Blog, BlogQuery, CreateBlogPayload, UpdateBlogPayload};
use crate::{
    auth::AdminClaims,
    schema::blogs,
    utils::{AppError, AppPath, AppQuery, ValidatedJson, types::{JsonResult, Pool}},
};

fn required_slug(slug: Option<String>) -> Result<String, AppError> {
    slug.filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("slug is required".to_owned()))
}

/// Lists posts newest first, or returns one post when `?slug=` is given.
pub async fn get_blogs(
    State(pool): State<Pool>,
    AppQuery(query): AppQuery<BlogQuery>,
) -> Result<Response, AppError> {
    if let Some(slug) = query.slug.filter(|s| !s.is_empty()) {
        return find(&pool, slug).await.map(|blog| Json(blog).into_response());
    }

    let mut conn = pool.get().await?;

    let posts = blogs::table
        .select(Blog::as_select())
        .order(blogs::created_at.desc())
        .load(&mut conn)
        .await?;

    Ok(Json(posts).into_response())
}

pub async fn get_blog_by_slug(
    State(pool): State<Pool>,
    AppPath(slug): AppPath<String>,
) -> JsonResult<Blog> {
    find(&pool, slug).await.map(Json)
}

pub async fn create_blog(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    ValidatedJson(payload): ValidatedJson<CreateBlogPayload>,
) -> JsonResult<Blog> {
    let new_blog = payload
        .into_new()
        .ok_or_else(|| AppError::Validation("slug or title is required".to_owned()))?;

    let mut conn = pool.get().await?;

    let blog = diesel::insert_into(blogs::table)
        .values(&new_blog)
        .returning(Blog::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                AppError::Validation(format!("Blog with slug {} already exists", new_blog.slug))
            }
            other => other.into(),
        })?;

    info!(slug = %blog.slug, "blog created");

    Ok(Json(blog))
}

pub async fn update_blog(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppQuery(query): AppQuery<BlogQuery>,
    ValidatedJson(payload): ValidatedJson<UpdateBlogPayload>,
) -> JsonResult<Blog> {
    let slug = required_slug(
        query
            .slug
            .filter(|s| !s.is_empty())
            .or_else(|| payload.slug.clone()),
    )?;
    apply_update(&pool, slug, payload).await.map(Json)
}

/// Partial update: only the fields present in the body are written.
pub async fn update_blog_by_slug(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppPath(slug): AppPath<String>,
    ValidatedJson(payload): ValidatedJson<UpdateBlogPayload>,
) -> JsonResult<Blog> {
    apply_update(&pool, slug, payload).await.map(Json)
}

pub async fn delete_blog(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppQuery(query): AppQuery<BlogQuery>,
) -> JsonResult<Blog> {
    let slug = required_slug(query.slug)?;
    remove(&pool, slug).await.map(Json)
}

pub async fn delete_blog_by_slug(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppPath(slug): AppPath<String>,
) -> JsonResult<Blog> {
    remove(&pool, slug).await.map(Json)
}

async fn apply_update(
    pool: &Pool,
    slug: String,
    payload: UpdateBlogPayload,
) -> Result<Blog, AppError> {
    let changes = payload
        .into_changes()
        .ok_or_else(|| AppError::Validation("nothing to update".to_owned()))?;

    let mut conn = pool.get().await?;

    let blog = diesel::update(blogs::table.find(slug.as_str()))
        .set(&changes)
        .returning(Blog::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Blog {slug} not found")))?;

    info!(slug = %blog.slug, "blog updated");

    Ok(blog)
}

async fn remove(pool: &Pool, slug: String) -> Result<Blog, AppError> {
    let mut conn = pool.get().await?;

    let blog = diesel::delete(blogs::table.find(slug.as_str()))
        .returning(Blog::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Blog {slug} not found")))?;

    info!(slug = %blog.slug, "blog deleted");

    Ok(blog)
}

async fn find(pool: &Pool, slug: String) -> Result<Blog, AppError> {
    let mut conn = pool.get().await?;

    blogs::table
        .find(slug.as_str())
        .select(Blog::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Blog {slug} not found")))
}
