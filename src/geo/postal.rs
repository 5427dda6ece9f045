use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use super::models::PostOffice;

#[derive(Debug, Deserialize)]
struct PostalResponse {
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "PostOffice", default)]
    post_office: Option<Vec<RawPostOffice>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
struct RawPostOffice {
    name: Option<String>,
    branch_type: Option<String>,
    district: Option<String>,
    state: Option<String>,
    country: Option<String>,
    pincode: Option<String>,
    division: Option<String>,
    region: Option<String>,
    circle: Option<String>,
}

impl From<RawPostOffice> for PostOffice {
    fn from(raw: RawPostOffice) -> Self {
        Self {
            name: raw.name.unwrap_or_default(),
            branch_type: raw.branch_type.unwrap_or_default(),
            district: raw.district.unwrap_or_default(),
            state: raw.state.unwrap_or_default(),
            country: raw.country.unwrap_or_else(|| "India".to_owned()),
            pincode: raw.pincode.unwrap_or_default(),
            division: raw.division.unwrap_or_default(),
            region: raw.region.unwrap_or_default(),
            circle: raw.circle.unwrap_or_default(),
            distance_km: None,
            slug: None,
            phone: None,
            lat: None,
            lng: None,
            map_url: None,
        }
    }
}

/// Post offices serving `pincode`. Any upstream failure or timeout yields an empty list.
pub async fn lookup_post_offices(
    http: &Client,
    api_base: &str,
    timeout: Duration,
    pincode: &str,
) -> Vec<PostOffice> {
    match fetch(http, api_base, timeout, pincode).await {
        Ok(offices) => offices,
        Err(e) => {
            warn!(pincode, error = %e, "postal lookup failed");
            Vec::new()
        }
    }
}

async fn fetch(
    http: &Client,
    api_base: &str,
    timeout: Duration,
    pincode: &str,
) -> Result<Vec<PostOffice>, reqwest::Error> {
    let responses: Vec<PostalResponse> = http
        .get(format!("{api_base}/pincode/{pincode}"))
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(parse_offices(responses))
}

fn parse_offices(responses: Vec<PostalResponse>) -> Vec<PostOffice> {
    responses
        .into_iter()
        .filter(|r| r.status.eq_ignore_ascii_case("success"))
        .flat_map(|r| r.post_office.unwrap_or_default())
        .map(PostOffice::from)
        .collect()
}
