use std::sync::Arc;

use axum::extract::{Json, State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::info;

use super::{
    models::{Lead, LeadRequest, LeadResponse},
    relay::relay,
};
use crate::{
    auth::AdminClaims,
    config::Config,
    schema::leads,
    utils::{AppJson, types::{JsonResult, Pool}},
};

/// Persists the lead, then fans it out. Only the insert can fail the request.
pub async fn create_lead(
    State(pool): State<Pool>,
    State(config): State<Arc<Config>>,
    State(http): State<reqwest::Client>,
    AppJson(req): AppJson<LeadRequest>,
) -> JsonResult<LeadResponse> {
    let new_lead = req.into_new()?;

    let mut conn = pool.get().await?;

    let lead = diesel::insert_into(leads::table)
        .values(&new_lead)
        .returning(Lead::as_returning())
        .get_result(&mut conn)
        .await?;
    drop(conn);

    info!(id = lead.id, source = ?lead.source, "lead captured");

    let debug = relay(&http, &config, &lead).await;

    Ok(Json(LeadResponse {
        success: true,
        id: lead.id,
        debug,
    }))
}

pub async fn get_leads(_admin: AdminClaims, State(pool): State<Pool>) -> JsonResult<Vec<Lead>> {
    let mut conn = pool.get().await?;

    let all = leads::table
        .select(Lead::as_select())
        .order(leads::created_at.desc())
        .load(&mut conn)
        .await?;

    Ok(Json(all))
}
