use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::models::domain::{GeoPoint, SearchQuery};

/// Query string of the search endpoint
///
/// Geo parameters are deliberately not validated: a missing or unusable
/// center or radius just means no geo constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[serde(default)]
    #[validate(length(max = 256))]
    pub q: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
    #[serde(default, rename = "radiusKm", alias = "radius_km", deserialize_with = "lenient_f64")]
    pub radius_km: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u16>,
}

/// Unparseable numbers become `None` instead of rejecting the request
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse::<f64>().ok()))
}

impl SearchRequest {
    /// Engine query for this request
    pub fn to_query(&self) -> SearchQuery {
        let center = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        };

        SearchQuery {
            text: self.q.clone(),
            center,
            radius_km: self.radius_km,
        }
    }
}
