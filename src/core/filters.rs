use crate::core::distance::distance_km;
use crate::models::{GeoCenter, RankedResult};

/// Keep results within `radius_km` of `center`, nearest first
///
/// Results without a coordinate are dropped. The boundary is inclusive.
/// Survivors are annotated with their distance and re-sorted ascending by
/// it (stable, so equal distances keep the incoming text order).
///
/// With no center, or a non-finite / non-positive radius, the input is
/// returned unchanged.
pub fn geo_filter(
    results: Vec<RankedResult>,
    center: Option<GeoCenter>,
    radius_km: f64,
) -> Vec<RankedResult> {
    let center = match center {
        Some(c) if c.is_valid() => c,
        _ => return results,
    };
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return results;
    }

    let mut kept: Vec<RankedResult> = results
        .into_iter()
        .filter_map(|mut result| {
            let location = result.record.location?;
            let distance = distance_km(center, location);
            if distance <= radius_km {
                result.distance_km = Some(distance);
                Some(result)
            } else {
                None
            }
        })
        .collect();

    kept.sort_by(|a, b| {
        let da = a.distance_km.unwrap_or(f64::INFINITY);
        let db = b.distance_km.unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
    });

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, ProfessionalRecord};

    const CENTER: GeoPoint = GeoPoint { lat: -23.5505, lng: -46.6333 };

    fn result(id: &str, score: u32, location: Option<(f64, f64)>) -> RankedResult {
        let mut record = ProfessionalRecord::new(id, format!("Pro {}", id), "Pintura", vec![]);
        if let Some((lat, lng)) = location {
            record = record.with_location(lat, lng);
        }
        RankedResult::new(record, score)
    }

    #[test]
    fn test_filters_and_sorts_by_distance() {
        let input = vec![
            result("far", 3, Some((-23.60, -46.70))),   // ~8.7 km
            result("near", 1, Some((-23.552, -46.634))), // ~0.2 km
            result("out", 5, Some((-22.90, -43.17))),   // Rio, ~360 km
            result("none", 9, None),
        ];

        let output = geo_filter(input, Some(CENTER), 20.0);
        let ids: Vec<_> = output.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["near", "far"]);
        assert!(output[0].distance_km.unwrap() < output[1].distance_km.unwrap());
        assert_eq!(output[1].score, 3);
    }

    #[test]
    fn test_center_point_included_at_zero_distance() {
        let output = geo_filter(vec![result("here", 0, Some((CENTER.lat, CENTER.lng)))], Some(CENTER), 0.001);
        assert_eq!(output.len(), 1);
        assert!(output[0].distance_km.unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_missing_center_or_bad_radius_is_noop() {
        let input = vec![result("a", 1, None), result("b", 2, Some((0.0, 0.0)))];

        for (center, radius) in [
            (None, 10.0),
            (Some(CENTER), 0.0),
            (Some(CENTER), -1.0),
            (Some(CENTER), f64::NAN),
            (Some(CENTER), f64::INFINITY),
            (Some(GeoPoint::new(f64::NAN, 0.0)), 10.0),
        ] {
            let output = geo_filter(input.clone(), center, radius);
            assert_eq!(output, input);
        }
    }

    #[test]
    fn test_equal_distance_keeps_input_order() {
        let input = vec![
            result("x", 2, Some((CENTER.lat, CENTER.lng))),
            result("y", 1, Some((CENTER.lat, CENTER.lng))),
        ];
        let output = geo_filter(input, Some(CENTER), 1.0);
        let ids: Vec<_> = output.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["x", "y"]);
    }
}
