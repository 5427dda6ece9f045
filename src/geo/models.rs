use serde::{Deserialize, Serialize};

use super::{branches::Branch, pickup::round2};

/// Normalised office record returned by the pincode lookup in both modes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostOffice {
    pub name: String,
    pub branch_type: String,
    pub district: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
    pub division: String,
    pub region: String,
    pub circle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
}

impl PostOffice {
    pub fn from_branch(branch: &Branch, distance_km: f64) -> Self {
        Self {
            name: branch.name.clone(),
            branch_type: "Pickup Point".to_owned(),
            district: branch.city.clone(),
            state: branch.state.clone(),
            country: "India".to_owned(),
            pincode: branch.postal_code.clone(),
            division: branch.address_line.clone(),
            region: branch.locality.clone().unwrap_or_else(|| branch.city.clone()),
            circle: branch.state.clone(),
            distance_km: Some(round2(distance_km)),
            slug: Some(branch.slug.clone()),
            phone: Some(branch.phone.clone()),
            lat: branch.lat,
            lng: branch.lng,
            map_url: branch.listing_url.clone().or_else(|| {
                branch.coordinates().map(|c| {
                    format!(
                        "https://www.google.com/maps/search/?api=1&query={},{}",
                        c.lat, c.lng
                    )
                })
            }),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PincodeQuery {
    pub pickup: Option<String>,
    pub radius_km: Option<String>,
}

impl PincodeQuery {
    pub fn pickup_mode(&self) -> bool {
        matches!(
            self.pickup.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("1" | "true" | "yes" | "on")
        )
    }

    pub fn requested_radius(&self) -> Option<f64> {
        self.radius_km.as_deref()?.trim().parse().ok()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PincodeResponse {
    pub success: bool,
    pub pincode: String,
    pub mode: LookupMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_km: Option<f64>,
    pub count: usize,
    pub offices: Vec<PostOffice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    Postal,
    Pickup,
}

#[derive(Debug, Deserialize)]
pub struct ResolvePlaceRequest {
    #[serde(alias = "url", alias = "input")]
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPlace {
    pub name: String,
    pub formatted_address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub phone: Option<String>,
    pub map_url: Option<String>,
    pub place_id: Option<String>,
    pub source: String,
}
