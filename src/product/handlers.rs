use axum::extract::{Json, State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::info;

use super::models::{Product, ProductFilter, ProductPayload, ProductRow};
use crate::{
    auth::AdminClaims,
    schema::products,
    utils::{AppError, AppPath, AppQuery, ValidatedJson, types::{JsonResult, Pool}},
};

pub async fn get_products(
    State(pool): State<Pool>,
    AppQuery(filter): AppQuery<ProductFilter>,
) -> JsonResult<Vec<Product>> {
    let mut conn = pool.get().await?;

    let mut query = products::table
        .select(ProductRow::as_select())
        .order((products::created_at.desc(), products::id.desc()))
        .into_boxed();

    if let Some(category) = filter.category.filter(|c| !c.is_empty()) {
        query = query.filter(products::category.eq(category));
    }
    if let Some(in_stock) = filter.in_stock {
        query = query.filter(products::in_stock.eq(in_stock));
    }

    let rows = query.load(&mut conn).await?;

    Ok(Json(rows.into_iter().map(Product::from).collect()))
}

pub async fn get_product_by_id(
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
) -> JsonResult<Product> {
    let mut conn = pool.get().await?;

    let row = products::table
        .find(id)
        .select(ProductRow::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;

    Ok(Json(row.into()))
}

pub async fn create_product(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    ValidatedJson(payload): ValidatedJson<ProductPayload>,
) -> JsonResult<Product> {
    let new_product = payload
        .into_new()
        .ok_or_else(|| AppError::Validation("name is required".to_owned()))?;

    let mut conn = pool.get().await?;

    let row = diesel::insert_into(products::table)
        .values(&new_product)
        .returning(ProductRow::as_returning())
        .get_result(&mut conn)
        .await?;

    info!(id = row.id, name = %row.name, "product created");

    Ok(Json(row.into()))
}

pub async fn update_product(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
    ValidatedJson(payload): ValidatedJson<ProductPayload>,
) -> JsonResult<Product> {
    let mut conn = pool.get().await?;

    let row = diesel::update(products::table.find(id))
        .set(&payload.into_changes())
        .returning(ProductRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;

    info!(id, "product updated");

    Ok(Json(row.into()))
}

pub async fn remove_product(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppPath(id): AppPath<i32>,
) -> JsonResult<Product> {
    let mut conn = pool.get().await?;

    let row = diesel::delete(products::table.find(id))
        .returning(ProductRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;

    info!(id, "product deleted");

    Ok(Json(row.into()))
}
