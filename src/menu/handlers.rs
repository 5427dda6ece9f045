use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};
use tracing::info;

use super::models::{
    Menu, MenuItem, MenuList, MenuQuery, MenuResponse, NewMenu, NewMenuItem, SaveMenuRequest,
};
use super::tree::{build_tree, flatten};
use crate::{
    auth::AdminClaims,
    schema::{menu_items, menus},
    utils::{AppError, AppJson, AppQuery, types::Pool, validate::non_empty},
};

pub async fn get_menus(
    State(pool): State<Pool>,
    AppQuery(query): AppQuery<MenuQuery>,
) -> Result<Response, AppError> {
    let mut conn = pool.get().await?;

    let Some(slug) = non_empty(query.slug) else {
        let menus = menus::table
            .order(menus::slug.asc())
            .select(Menu::as_select())
            .load(&mut conn)
            .await?;

        return Ok(Json(MenuList {
            success: true,
            menus,
        })
        .into_response());
    };

    let menu = menus::table
        .filter(menus::slug.eq(&slug))
        .select(Menu::as_select())
        .first(&mut conn)
        .await
        .optional()?;

    let Some(menu) = menu else {
        return Ok(Json(MenuResponse {
            success: true,
            slug,
            name: None,
            items: Vec::new(),
        })
        .into_response());
    };

    let rows = MenuItem::belonging_to(&menu)
        .select(MenuItem::as_select())
        .load(&mut conn)
        .await?;

    Ok(Json(MenuResponse {
        success: true,
        slug: menu.slug,
        name: Some(menu.name),
        items: build_tree(&rows),
    })
    .into_response())
}

/// Replaces the whole item set of a menu. Upsert, delete and re-insert share
/// one transaction so readers never see a half-written menu.
pub async fn save_menu(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppQuery(query): AppQuery<MenuQuery>,
    AppJson(payload): AppJson<SaveMenuRequest>,
) -> Result<Json<MenuResponse>, AppError> {
    let slug = non_empty(payload.slug)
        .or_else(|| non_empty(query.slug))
        .ok_or_else(|| AppError::Validation("slug is required".to_owned()))?;
    let name = non_empty(payload.name);

    let flat = flatten(&payload.items).map_err(|e| AppError::Validation(e.to_string()))?;
    let item_count = flat.len();

    let mut conn = pool.get().await?;

    let (menu, rows) = conn
        .transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let now = Utc::now();
                let new_menu = NewMenu {
                    slug: &slug,
                    name: name.as_deref().unwrap_or(&slug),
                };

                let menu: Menu = match name.as_deref() {
                    Some(name) => {
                        diesel::insert_into(menus::table)
                            .values(&new_menu)
                            .on_conflict(menus::slug)
                            .do_update()
                            .set((menus::name.eq(name), menus::updated_at.eq(now)))
                            .returning(Menu::as_returning())
                            .get_result(conn)
                            .await?
                    }
                    None => {
                        diesel::insert_into(menus::table)
                            .values(&new_menu)
                            .on_conflict(menus::slug)
                            .do_update()
                            .set(menus::updated_at.eq(now))
                            .returning(Menu::as_returning())
                            .get_result(conn)
                            .await?
                    }
                };

                diesel::delete(menu_items::table.filter(menu_items::menu_id.eq(menu.id)))
                    .execute(conn)
                    .await?;

                let mut assigned: Vec<i32> = Vec::with_capacity(flat.len());
                for item in &flat {
                    let row = NewMenuItem {
                        menu_id: menu.id,
                        parent_id: item.parent.map(|p| assigned[p]),
                        label: item.label,
                        href: item.href,
                        target: item.target,
                        sort_order: item.sort_order,
                        active: item.active,
                    };

                    let id = diesel::insert_into(menu_items::table)
                        .values(&row)
                        .returning(menu_items::id)
                        .get_result::<i32>(conn)
                        .await?;
                    assigned.push(id);
                }

                let rows = MenuItem::belonging_to(&menu)
                    .select(MenuItem::as_select())
                    .load(conn)
                    .await?;

                Ok((menu, rows))
            }
            .scope_boxed()
        })
        .await?;

    info!(slug = %menu.slug, items = item_count, "menu saved");

    Ok(Json(MenuResponse {
        success: true,
        slug: menu.slug,
        name: Some(menu.name),
        items: build_tree(&rows),
    }))
}

pub async fn delete_menu(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppQuery(query): AppQuery<MenuQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let slug =
        non_empty(query.slug).ok_or_else(|| AppError::Validation("slug is required".to_owned()))?;

    let mut conn = pool.get().await?;

    let deleted = diesel::delete(menus::table.filter(menus::slug.eq(&slug)))
        .execute(&mut conn)
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound(format!("Menu {slug} not found")));
    }

    info!(%slug, "menu deleted");

    Ok(Json(serde_json::json!({ "success": true, "slug": slug })))
}
