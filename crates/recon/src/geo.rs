//! Placemark collection -> key -> coordinate lookup.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Serialize;

use crate::key::normalize_opt;

/// A named point from the overlay source, before any validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Placemark {
    pub name: Option<String>,
    /// Raw `lon,lat[,alt] [more triples...]` text.
    pub coordinates: String,
}

impl Placemark {
    pub fn new(name: Option<&str>, coordinates: &str) -> Self {
        Self {
            name: name.map(str::to_string),
            coordinates: coordinates.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Which parsed coordinates are accepted into the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinatePolicy {
    /// Both values must be finite numbers.
    #[default]
    Finite,
    /// Finite and non-zero on both axes.
    NonZero,
}

impl CoordinatePolicy {
    fn accepts(&self, p: &GeoPoint) -> bool {
        let finite = p.latitude.is_finite() && p.longitude.is_finite();
        match self {
            Self::Finite => finite,
            Self::NonZero => finite && p.latitude != 0.0 && p.longitude != 0.0,
        }
    }
}

/// Parse the first coordinate triple: longitude first, then latitude.
///
/// Returns `None` when either field is missing or not a number. Altitude
/// and any further triples are ignored.
pub fn parse_coordinates(text: &str) -> Option<GeoPoint> {
    let first = text.split_whitespace().next()?;
    let mut fields = first.split(',');
    let longitude = parse_number(fields.next()?)?;
    let latitude = parse_number(fields.next()?)?;
    Some(GeoPoint { latitude, longitude })
}

fn parse_number(field: &str) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    field.parse::<f64>().ok()
}

/// Counters collected while building the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GeoIndexStats {
    pub indexed: usize,
    pub skipped: usize,
    pub duplicates: usize,
}

/// Canonical key -> point. The first point inserted for a key is kept.
#[derive(Debug, Clone, Default)]
pub struct GeoIndex {
    points: HashMap<String, GeoPoint>,
    stats: GeoIndexStats,
}

impl GeoIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the key is already present. Returns whether it was new.
    pub fn insert_first(&mut self, key: String, point: GeoPoint) -> bool {
        match self.points.entry(key) {
            Entry::Occupied(_) => {
                self.stats.duplicates += 1;
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(point);
                self.stats.indexed += 1;
                true
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&GeoPoint> {
        self.points.get(key)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn stats(&self) -> GeoIndexStats {
        self.stats
    }
}

/// Build the lookup from a placemark collection.
///
/// Placemarks with an empty key or coordinates rejected by `policy` are
/// skipped silently; later duplicates of an indexed key are ignored.
pub fn build_index(placemarks: &[Placemark], policy: CoordinatePolicy) -> GeoIndex {
    let mut index = GeoIndex::new();

    for pm in placemarks {
        let key = normalize_opt(pm.name.as_deref());
        if key.is_empty() {
            index.stats.skipped += 1;
            continue;
        }
        match parse_coordinates(&pm.coordinates) {
            Some(point) if policy.accepts(&point) => {
                index.insert_first(key, point);
            }
            _ => index.stats.skipped += 1,
        }
    }

    let stats = index.stats();
    log::debug!(
        "geo index: {} keys, {} placemarks skipped, {} duplicates ignored",
        stats.indexed,
        stats.skipped,
        stats.duplicates
    );
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_lon_lat_order() {
        let p = parse_coordinates("10.5,-3.2,0").unwrap();
        assert_eq!(p.longitude, 10.5);
        assert_eq!(p.latitude, -3.2);
    }

    #[test]
    fn only_first_triple_is_used() {
        let p = parse_coordinates("  -38.9,-4.9,0 -39.0,-5.0,0\n-40,-6,0 ").unwrap();
        assert_eq!(p.longitude, -38.9);
        assert_eq!(p.latitude, -4.9);
    }

    #[test]
    fn missing_or_bad_fields_fail() {
        assert!(parse_coordinates("").is_none());
        assert!(parse_coordinates("   ").is_none());
        assert!(parse_coordinates("10.5").is_none());
        assert!(parse_coordinates("10.5,").is_none());
        assert!(parse_coordinates("abc,1").is_none());
    }

    #[test]
    fn named_placemark_is_indexed() {
        let idx = build_index(&[Placemark::new(Some("abc-1"), "10.5,-3.2,0")], CoordinatePolicy::Finite);
        let p = idx.get("ABC1").unwrap();
        assert_eq!(p.longitude, 10.5);
        assert_eq!(p.latitude, -3.2);
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn first_duplicate_wins() {
        let idx = build_index(
            &[
                Placemark::new(Some("K1"), "1,2"),
                Placemark::new(Some("k-1"), "3,4"),
                Placemark::new(Some("K 1"), "5,6"),
            ],
            CoordinatePolicy::Finite,
        );
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.get("K1"), Some(&GeoPoint { latitude: 2.0, longitude: 1.0 }));
        assert_eq!(idx.stats().duplicates, 2);
    }

    #[test]
    fn invalid_placemarks_are_skipped() {
        let idx = build_index(
            &[
                Placemark::new(None, "1,2"),
                Placemark::new(Some("  "), "1,2"),
                Placemark::new(Some("A"), ""),
                Placemark::new(Some("B"), "x,y"),
                Placemark::new(Some("C"), "inf,2"),
                Placemark::new(Some("D"), "NaN,2"),
            ],
            CoordinatePolicy::Finite,
        );
        assert!(idx.is_empty());
        assert_eq!(idx.stats().skipped, 6);
    }

    #[test]
    fn skipped_placemark_does_not_block_a_later_valid_one() {
        let idx = build_index(
            &[Placemark::new(Some("A"), "bad"), Placemark::new(Some("A"), "7,8")],
            CoordinatePolicy::Finite,
        );
        assert_eq!(idx.get("A"), Some(&GeoPoint { latitude: 8.0, longitude: 7.0 }));
    }

    #[test]
    fn zero_coordinates_depend_on_policy() {
        let pms = [Placemark::new(Some("EQ"), "-38.5,0,0"), Placemark::new(Some("PM"), "0,-4.1")];
        let finite = build_index(&pms, CoordinatePolicy::Finite);
        assert_eq!(finite.len(), 2);
        let strict = build_index(&pms, CoordinatePolicy::NonZero);
        assert!(strict.is_empty());
    }

    proptest! {
        #[test]
        fn first_seen_point_is_retained(coords in prop::collection::vec((-180.0f64..180.0, -90.0f64..90.0), 1..10)) {
            let pms: Vec<Placemark> = coords
                .iter()
                .map(|(lon, lat)| Placemark::new(Some("dup"), &format!("{lon},{lat},0")))
                .collect();
            let idx = build_index(&pms, CoordinatePolicy::Finite);
            let (lon, lat) = coords[0];
            let got = idx.get("DUP").copied().unwrap();
            prop_assert_eq!(got.longitude, lon);
            prop_assert_eq!(got.latitude, lat);
        }
    }
}
