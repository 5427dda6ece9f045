use std::{sync::LazyLock, time::Duration};

use percent_encoding::percent_decode_str;
use regex::Regex;
use reqwest::{Client, Url, redirect::Policy};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::{
    geocode::{GeoError, Geocoder, GoogleGeometry, NominatimPlace},
    models::ResolvedPlace,
    pickup::Coordinates,
};
use crate::config::GeocodingConfig;

static SHORT_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(maps\.app\.goo\.gl|goo\.gl/maps|g\.co/kgs|g\.page)/")
        .expect("valid short link regex")
});

static PLACE_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/place/([^/?#]+)").expect("valid place segment regex"));

static DATA_COORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!3d(-?\d+(?:\.\d+)?)!4d(-?\d+(?:\.\d+)?)").expect("valid data coords regex")
});

static QUERY_COORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[?&])(?:q|query)=\s*(-?\d+(?:\.\d+)?)\s*(?:,|%2C)\s*(-?\d+(?:\.\d+)?)")
        .expect("valid query coords regex")
});

static VIEWPORT_COORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(-?\d+(?:\.\d+)?),(-?\d+(?:\.\d+)?)").expect("valid viewport regex")
});

const SEARCH_PARAMS: [&str; 4] = ["q", "query", "destination", "daddr"];

#[derive(Error, Debug)]
pub enum PlaceError {
    #[error("No results found")]
    NoResults,
}

#[derive(Debug, Deserialize)]
struct FindPlaceResponse {
    status: String,
    #[serde(default)]
    candidates: Vec<FindPlaceCandidate>,
}

#[derive(Debug, Deserialize)]
struct FindPlaceCandidate {
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct PlaceDetailsResponse {
    status: String,
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    place_id: Option<String>,
    name: Option<String>,
    formatted_address: Option<String>,
    formatted_phone_number: Option<String>,
    international_phone_number: Option<String>,
    url: Option<String>,
    geometry: Option<GoogleGeometry>,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl PlaceDetails {
    fn component(&self, kind: &str) -> Option<String> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
            .map(|c| c.long_name.clone())
    }

    fn into_place(self) -> ResolvedPlace {
        let city = self
            .component("locality")
            .or_else(|| self.component("administrative_area_level_2"));
        let state = self.component("administrative_area_level_1");
        let pincode = self.component("postal_code");
        let coords = self
            .geometry
            .as_ref()
            .and_then(|g| Coordinates::new(g.location.lat, g.location.lng));

        let map_url = self.url.clone().or_else(|| match (&self.place_id, coords) {
            (Some(id), Some(c)) => Some(format!(
                "https://www.google.com/maps/search/?api=1&query={},{}&query_place_id={id}",
                c.lat, c.lng
            )),
            (Some(id), None) => Some(format!("https://www.google.com/maps/place/?q=place_id:{id}")),
            (None, Some(c)) => Some(map_link(c)),
            (None, None) => None,
        });

        ResolvedPlace {
            name: self.name.unwrap_or_default(),
            formatted_address: self.formatted_address.unwrap_or_default(),
            city,
            state,
            pincode,
            lat: coords.map(|c| c.lat),
            lng: coords.map(|c| c.lng),
            phone: self.formatted_phone_number.or(self.international_phone_number),
            map_url,
            place_id: self.place_id,
            source: "google".to_owned(),
        }
    }
}

fn map_link(coords: Coordinates) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        coords.lat, coords.lng
    )
}

fn place_from_nominatim(place: NominatimPlace, source: &str) -> Option<ResolvedPlace> {
    let coords = place.coordinates().ok()?;
    let name = place
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .or_else(|| place.display_name.split(',').next().map(|s| s.trim().to_owned()))
        .unwrap_or_default();

    Some(ResolvedPlace {
        name,
        city: place.address.locality(),
        state: place.address.state.clone(),
        pincode: place.address.postcode.clone(),
        formatted_address: place.display_name,
        lat: Some(coords.lat),
        lng: Some(coords.lng),
        phone: None,
        map_url: Some(map_link(coords)),
        place_id: None,
        source: source.to_owned(),
    })
}

pub fn is_short_link(input: &str) -> bool {
    SHORT_LINK_RE.is_match(input.trim())
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().trim().to_owned()
}

/// Place name carried in a `/place/<name>/` path segment.
pub fn place_name_from_url(input: &str) -> Option<String> {
    PLACE_SEGMENT_RE
        .captures(input)
        .map(|c| decode_component(&c[1]))
        .filter(|name| !name.is_empty())
}

/// Turns a map or search URL into a text query; anything else passes through unchanged.
pub fn normalize_query(input: &str) -> String {
    let trimmed = input.trim();

    let Ok(url) = Url::parse(trimmed) else {
        return trimmed.to_owned();
    };

    if !matches!(url.scheme(), "http" | "https") {
        return trimmed.to_owned();
    }

    for key in SEARCH_PARAMS {
        if let Some((_, value)) = url
            .query_pairs()
            .find(|(k, v)| k == key && !v.trim().is_empty())
        {
            return value.trim().to_owned();
        }
    }

    place_name_from_url(url.path()).unwrap_or_else(|| trimmed.to_owned())
}

/// Coordinates embedded in a map URL or text, by priority: `!3d..!4d..` data
/// parameters, a `q=`/`query=` lat,lng pair, then an `@lat,lng` viewport.
pub fn extract_coordinates(input: &str) -> Option<Coordinates> {
    [&*DATA_COORDS_RE, &*QUERY_COORDS_RE, &*VIEWPORT_COORDS_RE]
        .into_iter()
        .find_map(|re| {
            let caps = re.captures(input)?;
            let lat = caps[1].parse().ok()?;
            let lng = caps[2].parse().ok()?;
            Coordinates::new(lat, lng)
        })
}

pub struct PlaceResolver<'a> {
    http: &'a Client,
    config: &'a GeocodingConfig,
}

impl<'a> PlaceResolver<'a> {
    pub fn new(http: &'a Client, config: &'a GeocodingConfig) -> Self {
        Self { http, config }
    }

    pub async fn resolve(&self, input: &str) -> Result<ResolvedPlace, PlaceError> {
        let original = input.trim();

        let expanded = if is_short_link(original) {
            self.expand_short_link(original)
                .await
                .unwrap_or_else(|| original.to_owned())
        } else {
            original.to_owned()
        };

        let query = normalize_query(&expanded);
        debug!(%original, %expanded, %query, "resolving place");

        if let Some(key) = &self.config.google_api_key {
            match self.google_place(key, &query).await {
                Ok(Some(place)) => return Ok(place),
                Ok(None) => debug!(%query, "google places found nothing"),
                Err(e) => warn!(%query, error = %e, "google places lookup failed"),
            }
        }

        let geocoder = Geocoder::new(self.http, self.config);

        let coords = extract_coordinates(&expanded)
            .or_else(|| extract_coordinates(original))
            .or_else(|| extract_coordinates(&query));

        if let Some(coords) = coords {
            match geocoder.reverse(coords).await {
                Ok(Some(found)) => {
                    if let Some(mut place) = place_from_nominatim(found, "coordinates") {
                        if let Some(name) = place_name_from_url(&expanded) {
                            place.name = name;
                        }
                        // keep the exact pin the link pointed at
                        place.lat = Some(coords.lat);
                        place.lng = Some(coords.lng);
                        place.map_url = Some(map_link(coords));
                        return Ok(place);
                    }
                }
                Ok(None) => debug!(?coords, "reverse geocoding found nothing"),
                Err(e) => warn!(?coords, error = %e, "reverse geocoding failed"),
            }
        }

        match geocoder.search(&query).await {
            Ok(Some(found)) => place_from_nominatim(found, "search").ok_or(PlaceError::NoResults),
            Ok(None) => Err(PlaceError::NoResults),
            Err(e) => {
                warn!(%query, error = %e, "forward geocoding failed");
                Err(PlaceError::NoResults)
            }
        }
    }

    /// Follows one redirect hop of a shortened map link. HEAD first, GET when HEAD
    /// carries no `Location`.
    async fn expand_short_link(&self, short: &str) -> Option<String> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(8))
            .user_agent(self.config.user_agent.clone())
            .build()
            .ok()?;

        let base = Url::parse(short).ok()?;

        for method in [reqwest::Method::HEAD, reqwest::Method::GET] {
            let response = match client.request(method.clone(), base.clone()).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(%short, %method, error = %e, "short link expansion failed");
                    continue;
                }
            };

            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|loc| base.join(loc).ok());

            if let Some(location) = location {
                return Some(location.to_string());
            }
        }

        None
    }

    async fn google_place(&self, key: &str, query: &str) -> Result<Option<ResolvedPlace>, GeoError> {
        let find: FindPlaceResponse = self
            .http
            .get(format!(
                "{}/maps/api/place/findplacefromtext/json",
                self.config.google_base
            ))
            .query(&[
                ("input", query),
                ("inputtype", "textquery"),
                ("fields", "place_id"),
                ("key", key),
            ])
            .timeout(self.config.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let place_id = match find.status.as_str() {
            "OK" => match find.candidates.into_iter().next() {
                Some(candidate) => candidate.place_id,
                None => return Ok(None),
            },
            "ZERO_RESULTS" => return Ok(None),
            other => return Err(GeoError::Status(other.to_owned())),
        };

        let details: PlaceDetailsResponse = self
            .http
            .get(format!("{}/maps/api/place/details/json", self.config.google_base))
            .query(&[
                ("place_id", place_id.as_str()),
                (
                    "fields",
                    "place_id,name,formatted_address,address_components,geometry,formatted_phone_number,international_phone_number,url",
                ),
                ("key", key),
            ])
            .timeout(self.config.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match details.status.as_str() {
            "OK" => Ok(details.result.map(PlaceDetails::into_place)),
            "ZERO_RESULTS" | "NOT_FOUND" => Ok(None),
            other => Err(GeoError::Status(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_short_links() {
        assert!(is_short_link("https://maps.app.goo.gl/AbCdEf123"));
        assert!(is_short_link("http://goo.gl/maps/xyz"));
        assert!(is_short_link("https://g.page/some-shop"));
        assert!(!is_short_link("https://www.google.com/maps/place/Foo"));
        assert!(!is_short_link("FASTag Point Peelamedu"));
    }

    #[test]
    fn normalize_prefers_search_parameters() {
        assert_eq!(
            normalize_query("https://www.google.com/maps/search/?api=1&query=Peelamedu+Coimbatore"),
            "Peelamedu Coimbatore"
        );
        assert_eq!(
            normalize_query("https://maps.google.com/?q=Gandhipuram%20Bus%20Stand"),
            "Gandhipuram Bus Stand"
        );
    }

    #[test]
    fn normalize_extracts_place_segment() {
        let url = "https://www.google.com/maps/place/FASTag+Point+Guindy/@13.0067,80.2206,17z/data=!3m1";
        assert_eq!(normalize_query(url), "FASTag Point Guindy");
    }

    #[test]
    fn normalize_passes_plain_text_through() {
        assert_eq!(normalize_query("  Saravanampatti  "), "Saravanampatti");
        assert_eq!(normalize_query("mailto:someone@example.in"), "mailto:someone@example.in");
    }

    #[test]
    fn coordinates_follow_priority_order() {
        let url = "https://www.google.com/maps/place/Shop/@11.01,76.95,17z/data=!3m1!4b1!4m6!3m5!1s0x0:0x1!8m2!3d11.0168!4d76.9558";
        assert_eq!(
            extract_coordinates(url),
            Some(Coordinates { lat: 11.0168, lng: 76.9558 })
        );

        let query = "https://maps.google.com/?q=11.0247,77.0027";
        assert_eq!(
            extract_coordinates(query),
            Some(Coordinates { lat: 11.0247, lng: 77.0027 })
        );

        let viewport = "https://www.google.com/maps/@13.0067,80.2206,15z";
        assert_eq!(
            extract_coordinates(viewport),
            Some(Coordinates { lat: 13.0067, lng: 80.2206 })
        );

        assert_eq!(extract_coordinates("Peelamedu Coimbatore"), None);
    }

    #[test]
    fn out_of_range_coordinates_are_ignored() {
        assert_eq!(extract_coordinates("https://maps.google.com/@123.0,10.0,15z"), None);
    }

    #[test]
    fn place_name_is_decoded() {
        assert_eq!(
            place_name_from_url("/maps/place/Sri+Ram%20Agencies/@1,2"),
            Some("Sri Ram Agencies".to_owned())
        );
        assert_eq!(place_name_from_url("/maps/search/foo"), None);
    }

    #[test]
    fn google_details_map_address_components() {
        let details: PlaceDetails = serde_json::from_value(serde_json::json!({
            "place_id": "ChIJabc",
            "name": "FASTag Point Peelamedu",
            "formatted_address": "1540, Avinashi Rd, Peelamedu, Coimbatore, Tamil Nadu 641004, India",
            "formatted_phone_number": "086674 60936",
            "geometry": { "location": { "lat": 11.0247, "lng": 77.0027 } },
            "address_components": [
                { "long_name": "Coimbatore", "short_name": "CBE", "types": ["locality", "political"] },
                { "long_name": "Tamil Nadu", "short_name": "TN", "types": ["administrative_area_level_1", "political"] },
                { "long_name": "641004", "short_name": "641004", "types": ["postal_code"] }
            ]
        }))
        .unwrap();

        let place = details.into_place();

        assert_eq!(place.city.as_deref(), Some("Coimbatore"));
        assert_eq!(place.state.as_deref(), Some("Tamil Nadu"));
        assert_eq!(place.pincode.as_deref(), Some("641004"));
        assert_eq!(place.phone.as_deref(), Some("086674 60936"));
        assert_eq!(
            place.map_url.as_deref(),
            Some("https://www.google.com/maps/search/?api=1&query=11.0247,77.0027&query_place_id=ChIJabc")
        );
        assert_eq!(place.source, "google");
    }
}
