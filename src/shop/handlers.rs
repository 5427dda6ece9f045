use axum::extract::{Json, State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::info;

use super::models::{NewShop, Shop, ShopQuery, UpdateShop, UpdateShopPayload};
use crate::{
    auth::AdminClaims,
    schema::shops,
    utils::{AppError, AppPath, AppQuery, ValidatedJson, types::{JsonResult, Pool}},
};

pub async fn get_shops(
    State(pool): State<Pool>,
    AppQuery(query): AppQuery<ShopQuery>,
) -> JsonResult<Vec<Shop>> {
    let mut conn = pool.get().await?;

    let mut select = shops::table
        .select(Shop::as_select())
        .order((shops::name.asc(), shops::id.asc()))
        .into_boxed();

    if let Some(id) = query.id {
        select = select.filter(shops::id.eq(id));
    }
    if let Some(status) = query.status.filter(|s| !s.is_empty()) {
        select = select.filter(shops::status.eq(status));
    }

    Ok(Json(select.load(&mut conn).await?))
}

pub async fn create_shop(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    ValidatedJson(payload): ValidatedJson<NewShop>,
) -> JsonResult<Shop> {
    let mut conn = pool.get().await?;

    let shop = diesel::insert_into(shops::table)
        .values(&payload)
        .returning(Shop::as_returning())
        .get_result(&mut conn)
        .await?;

    info!(id = shop.id, name = %shop.name, "shop created");

    Ok(Json(shop))
}

/// `PUT /shops?id=` and `PUT /shops/{id}`; the id may also travel in the body.
pub async fn update_shop(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppQuery(query): AppQuery<ShopQuery>,
    ValidatedJson(payload): ValidatedJson<UpdateShopPayload>,
) -> JsonResult<Shop> {
    let id = query
        .id
        .or(payload.id)
        .ok_or_else(|| AppError::Validation("shop id is required".to_owned()))?;

    apply_update(pool, id, payload).await
}

pub async fn update_shop_by_id(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateShopPayload>,
) -> JsonResult<Shop> {
    apply_update(pool, id, payload).await
}

async fn apply_update(
    pool: Pool,
    id: i32,
    payload: UpdateShopPayload,
) -> JsonResult<Shop> {
    let mut conn = pool.get().await?;

    let shop = diesel::update(shops::table.find(id))
        .set(&UpdateShop::from(payload))
        .returning(Shop::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Shop {id} not found")))?;

    info!(id, "shop updated");

    Ok(Json(shop))
}

pub async fn delete_shop(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppQuery(query): AppQuery<ShopQuery>,
) -> JsonResult<Shop> {
    let id = query
        .id
        .ok_or_else(|| AppError::Validation("shop id is required".to_owned()))?;

    remove(pool, id).await
}

pub async fn delete_shop_by_id(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
) -> JsonResult<Shop> {
    remove(pool, id).await
}

async fn remove(pool: Pool, id: i32) -> JsonResult<Shop> {
    let mut conn = pool.get().await?;

    let shop = diesel::delete(shops::table.find(id))
        .returning(Shop::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Shop {id} not found")))?;

    info!(id, "shop deleted");

    Ok(Json(shop))
}
