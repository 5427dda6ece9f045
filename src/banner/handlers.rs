use axum::extract::{Json, State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::info;

use super::models::{Banner, BannerQuery, NewBanner, UpdateBanner, UpdateBannerPayload};
use crate::{
    auth::AdminClaims,
    schema::banners,
    utils::{AppError, AppQuery, ValidatedJson, types::{JsonResult, Pool}},
};

/// Active banners for the hero carousel; `?all=1` lists inactive ones too for admins.
pub async fn get_banners(
    admin: Option<AdminClaims>,
    State(pool): State<Pool>,
    AppQuery(query): AppQuery<BannerQuery>,
) -> JsonResult<Vec<Banner>> {
    let include_inactive = query.include_inactive();
    if include_inactive && admin.is_none() {
        return Err(AppError::Unauthorized);
    }

    let mut conn = pool.get().await?;

    let mut select = banners::table
        .select(Banner::as_select())
        .order((banners::sort_order.asc(), banners::created_at.desc()))
        .into_boxed();

    if !include_inactive {
        select = select.filter(banners::active.eq(true));
    }

    Ok(Json(select.load(&mut conn).await?))
}

pub async fn create_banner(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    ValidatedJson(payload): ValidatedJson<NewBanner>,
) -> JsonResult<Banner> {
    let mut conn = pool.get().await?;

    let banner = diesel::insert_into(banners::table)
        .values(&payload)
        .returning(Banner::as_returning())
        .get_result(&mut conn)
        .await?;

    info!(id = banner.id, title = %banner.title, "banner created");

    Ok(Json(banner))
}

pub async fn update_banner(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppQuery(query): AppQuery<BannerQuery>,
    ValidatedJson(payload): ValidatedJson<UpdateBannerPayload>,
) -> JsonResult<Banner> {
    let id = query
        .id
        .or(payload.id)
        .ok_or_else(|| AppError::Validation("banner id is required".to_owned()))?;

    let changes = UpdateBanner::from(payload);
    if changes.is_empty() {
        return Err(AppError::Validation("nothing to update".to_owned()));
    }

    let mut conn = pool.get().await?;

    let banner = diesel::update(banners::table.find(id))
        .set(&changes)
        .returning(Banner::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Banner {id} not found")))?;

    info!(id, "banner updated");

    Ok(Json(banner))
}

pub async fn delete_banner(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppQuery(query): AppQuery<BannerQuery>,
) -> JsonResult<Banner> {
    let id = query
        .id
        .ok_or_else(|| AppError::Validation("banner id is required".to_owned()))?;

    let mut conn = pool.get().await?;

    let banner = diesel::delete(banners::table.find(id))
        .returning(Banner::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Banner {id} not found")))?;

    info!(id, "banner deleted");

    Ok(Json(banner))
}
