use serde::Serialize;

/// Physical branch that doubles as a pickup point during checkout.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub slug: String,
    pub name: String,
    pub address_line: String,
    pub locality: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub listing_url: Option<String>,
    pub neighborhoods: Vec<String>,
}

impl Branch {
    pub fn coordinates(&self) -> Option<super::pickup::Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(super::pickup::Coordinates { lat, lng }),
            _ => None,
        }
    }
}

struct Seed {
    slug: &'static str,
    name: &'static str,
    address_line: &'static str,
    locality: Option<&'static str>,
    city: &'static str,
    state: &'static str,
    postal_code: &'static str,
    phone: &'static str,
    coordinates: Option<(f64, f64)>,
    listing_url: Option<&'static str>,
    neighborhoods: &'static [&'static str],
}

const SEEDS: &[Seed] = &[
    Seed {
        slug: "coimbatore-gandhipuram",
        name: "FASTag Point Gandhipuram",
        address_line: "112, Cross Cut Road, Gandhipuram",
        locality: Some("Gandhipuram"),
        city: "Coimbatore",
        state: "Tamil Nadu",
        postal_code: "641012",
        phone: "+91 86674 60935",
        coordinates: Some((11.0168, 76.9558)),
        listing_url: Some("https://maps.google.com/?cid=4471204871123331001"),
        neighborhoods: &["Gandhipuram", "Ram Nagar", "Siddhapudur"],
    },
    Seed {
        slug: "coimbatore-peelamedu",
        name: "FASTag Point Peelamedu",
        address_line: "1540, Avinashi Road, Peelamedu",
        locality: Some("Peelamedu"),
        city: "Coimbatore",
        state: "Tamil Nadu",
        postal_code: "641004",
        phone: "+91 86674 60936",
        coordinates: Some((11.0247, 77.0027)),
        listing_url: Some("https://maps.google.com/?cid=4471204871123331002"),
        neighborhoods: &["Peelamedu", "Hope College", "Sowripalayam"],
    },
    Seed {
        slug: "coimbatore-saravanampatti",
        name: "FASTag Point Saravanampatti",
        address_line: "21, Sathy Road, Saravanampatti",
        locality: Some("Saravanampatti"),
        city: "Coimbatore",
        state: "Tamil Nadu",
        postal_code: "641035",
        phone: "+91 86674 60937",
        coordinates: Some((11.0776, 76.9981)),
        listing_url: None,
        neighborhoods: &["Saravanampatti", "Kalapatti", "Vilankurichi"],
    },
    Seed {
        slug: "tiruppur-avinashi-road",
        name: "FASTag Point Tiruppur",
        address_line: "88, Avinashi Road, Pushpa Theatre Junction",
        locality: None,
        city: "Tiruppur",
        state: "Tamil Nadu",
        postal_code: "641602",
        phone: "+91 86674 60938",
        coordinates: Some((11.1085, 77.3411)),
        listing_url: None,
        neighborhoods: &[],
    },
    Seed {
        slug: "chennai-guindy",
        name: "FASTag Point Guindy",
        address_line: "7, GST Road, Guindy",
        locality: Some("Guindy"),
        city: "Chennai",
        state: "Tamil Nadu",
        postal_code: "600032",
        phone: "+91 86674 60939",
        coordinates: Some((13.0067, 80.2206)),
        listing_url: Some("https://maps.google.com/?cid=4471204871123331005"),
        neighborhoods: &["Guindy", "Saidapet", "Ekkatuthangal"],
    },
    Seed {
        slug: "salem-five-roads",
        name: "FASTag Point Salem",
        address_line: "3, Omalur Main Road, Five Roads",
        locality: Some("Five Roads"),
        city: "Salem",
        state: "Tamil Nadu",
        postal_code: "636004",
        phone: "+91 86674 60940",
        coordinates: Some((11.6693, 78.1406)),
        listing_url: None,
        neighborhoods: &[],
    },
    Seed {
        slug: "madurai-anna-nagar",
        name: "FASTag Point Madurai",
        address_line: "45, 80 Feet Road, Anna Nagar",
        locality: Some("Anna Nagar"),
        city: "Madurai",
        state: "Tamil Nadu",
        postal_code: "625020",
        phone: "+91 86674 60941",
        coordinates: None,
        listing_url: None,
        neighborhoods: &["Anna Nagar", "K K Nagar"],
    },
];

pub fn default_branches() -> Vec<Branch> {
    SEEDS
        .iter()
        .map(|seed| Branch {
            slug: seed.slug.to_owned(),
            name: seed.name.to_owned(),
            address_line: seed.address_line.to_owned(),
            locality: seed.locality.map(str::to_owned),
            city: seed.city.to_owned(),
            state: seed.state.to_owned(),
            postal_code: seed.postal_code.to_owned(),
            phone: seed.phone.to_owned(),
            lat: seed.coordinates.map(|(lat, _)| lat),
            lng: seed.coordinates.map(|(_, lng)| lng),
            listing_url: seed.listing_url.map(str::to_owned),
            neighborhoods: seed.neighborhoods.iter().map(|n| (*n).to_owned()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_slugs_are_unique() {
        let branches = default_branches();
        let mut slugs: Vec<_> = branches.iter().map(|b| b.slug.as_str()).collect();
        slugs.sort_unstable();
        slugs.dedup();

        assert_eq!(slugs.len(), branches.len());
    }
}
