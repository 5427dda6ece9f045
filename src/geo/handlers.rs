use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

use super::{
    branches::Branch,
    geocode::Geocoder,
    models::{LookupMode, PincodeQuery, PincodeResponse, PostOffice, ResolvePlaceRequest, ResolvedPlace},
    pickup::{effective_radius, nearby_branches},
    places::PlaceResolver,
    postal::lookup_post_offices,
};
use crate::{
    config::Config,
    utils::{AppError, AppJson, AppPath, AppQuery, types::JsonResult, validate::is_valid_pincode},
};

pub async fn lookup_pincode(
    State(config): State<Arc<Config>>,
    State(http): State<reqwest::Client>,
    State(branches): State<Arc<[Branch]>>,
    AppPath(pincode): AppPath<String>,
    AppQuery(query): AppQuery<PincodeQuery>,
) -> Response {
    let pincode = pincode.trim().to_owned();
    let mode = if query.pickup_mode() {
        LookupMode::Pickup
    } else {
        LookupMode::Postal
    };

    if !is_valid_pincode(&pincode) {
        debug!(%pincode, "rejecting malformed pincode");
        let body = PincodeResponse {
            success: false,
            pincode,
            mode,
            radius_km: None,
            count: 0,
            offices: Vec::new(),
            error: Some("Pincode must be a 6 digit number not starting with 0".to_owned()),
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let (offices, radius_km) = match mode {
        LookupMode::Postal => {
            let offices = lookup_post_offices(
                &http,
                &config.postal_api_base,
                config.postal_timeout,
                &pincode,
            )
            .await;
            (offices, None)
        }
        LookupMode::Pickup => {
            let radius = effective_radius(query.requested_radius());
            let offices = match Geocoder::new(&http, &config.geocoding)
                .geocode_pincode(&pincode)
                .await
            {
                Some(origin) => nearby_branches(origin, &branches, radius)
                    .into_iter()
                    .map(|(branch, distance)| PostOffice::from_branch(branch, distance))
                    .collect(),
                None => Vec::new(),
            };
            (offices, Some(radius))
        }
    };

    info!(%pincode, ?mode, count = offices.len(), "pincode lookup");

    Json(PincodeResponse {
        success: true,
        pincode,
        mode,
        radius_km,
        count: offices.len(),
        offices,
        error: None,
    })
    .into_response()
}

pub async fn resolve_place(
    State(config): State<Arc<Config>>,
    State(http): State<reqwest::Client>,
    AppJson(payload): AppJson<ResolvePlaceRequest>,
) -> JsonResult<ResolvedPlace> {
    if payload.query.trim().is_empty() {
        return Err(AppError::Validation("query is required".to_owned()));
    }

    let place = PlaceResolver::new(&http, &config.geocoding)
        .resolve(&payload.query)
        .await
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    Ok(Json(place))
}
