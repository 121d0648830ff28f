use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::normalize::normalize;

/// Reasons a catalog entry is rejected at load time
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for field: {0}")]
    InvalidField(&'static str),
}

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Reference point for distance filtering
pub type GeoCenter = GeoPoint;

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the valid latitude/longitude ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Parse `{lat, lng}`, returning `None` for anything malformed
    fn from_value(value: &Value) -> Option<Self> {
        let lat = value.get("lat")?.as_f64()?;
        let lng = value.get("lng")?.as_f64()?;
        let point = Self::new(lat, lng);
        point.is_valid().then_some(point)
    }
}

/// A professional from the catalog
///
/// Never mutated after load; results carry their own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalRecord {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(rename = "localizacao", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl ProfessionalRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        keywords: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            keywords,
            location: None,
        }
    }

    pub fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some(GeoPoint::new(lat, lng));
        self
    }

    /// Validate a raw catalog entry
    ///
    /// `id` may be a string or a number. `nome` and `categoria` must be
    /// non-empty strings. Non-string keywords are ignored and an invalid
    /// `localizacao` is dropped rather than rejecting the record.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let obj = value.as_object().ok_or(RecordError::NotAnObject)?;

        let id = match obj.get("id") {
            None | Some(Value::Null) => return Err(RecordError::MissingField("id")),
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => return Err(RecordError::InvalidField("id")),
        };

        let name = required_string(obj.get("nome"), "nome")?;
        let category = required_string(obj.get("categoria"), "categoria")?;

        let keywords = obj
            .get("keywords")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let location = obj.get("localizacao").and_then(GeoPoint::from_value);

        Ok(Self {
            id,
            name,
            category,
            keywords,
            location,
        })
    }

    /// Normalized name + category + keywords, used by the substring fallback
    pub fn search_blob(&self) -> String {
        let mut raw = String::with_capacity(
            self.name.len() + self.category.len() + self.keywords.iter().map(|k| k.len() + 1).sum::<usize>() + 2,
        );
        raw.push_str(&self.name);
        raw.push(' ');
        raw.push_str(&self.category);
        for keyword in &self.keywords {
            raw.push(' ');
            raw.push_str(keyword);
        }
        normalize(&raw)
    }
}

fn required_string(value: Option<&Value>, field: &'static str) -> Result<String, RecordError> {
    match value {
        None | Some(Value::Null) => Err(RecordError::MissingField(field)),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(_) => Err(RecordError::InvalidField(field)),
    }
}

/// A search hit: a copy of the record with its text score and, when
/// geo-filtered, its distance from the query center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub record: ProfessionalRecord,
    pub score: u32,
    #[serde(rename = "distanciaKm", default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl RankedResult {
    pub fn new(record: ProfessionalRecord, score: u32) -> Self {
        Self {
            record,
            score,
            distance_km: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }
}

/// Per-call query parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub center: Option<GeoCenter>,
    pub radius_km: Option<f64>,
}

impl SearchQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn near(mut self, center: GeoCenter, radius_km: f64) -> Self {
        self.center = Some(center);
        self.radius_km = Some(radius_km);
        self
    }

    /// Center and radius when both are usable, `None` otherwise
    ///
    /// A missing, non-finite or out-of-range center and a missing,
    /// non-finite or non-positive radius all mean "no geo constraint".
    pub fn geo_constraint(&self) -> Option<(GeoCenter, f64)> {
        let center = self.center.filter(GeoPoint::is_valid)?;
        let radius = self.radius_km.filter(|r| r.is_finite() && *r > 0.0)?;
        Some((center, radius))
    }
}
