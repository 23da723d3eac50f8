const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Parses the `"lat, lon"` form stored in `places.gps`.
pub fn parse_gps(raw: &str) -> Option<Coordinates> {
    let (lat, lon) = raw.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some(Coordinates { lat, lon })
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_format() {
        let c = parse_gps("48.14061834357159, 17.12233203794686").unwrap();
        assert!((c.lat - 48.1406).abs() < 1e-3);
        assert!((c.lon - 17.1223).abs() < 1e-3);
        assert!(parse_gps("48.1,17.1").is_some());
    }

    #[test]
    fn rejects_garbage_and_out_of_range() {
        assert!(parse_gps("").is_none());
        assert!(parse_gps("48.1").is_none());
        assert!(parse_gps("north, east").is_none());
        assert!(parse_gps("91, 0").is_none());
    }

    #[test]
    fn distance_bratislava_to_vienna() {
        let bratislava = Coordinates { lat: 48.1486, lon: 17.1077 };
        let vienna = Coordinates { lat: 48.2082, lon: 16.3738 };
        let d = haversine_km(bratislava, vienna);
        assert!((50.0..60.0).contains(&d), "{d}");
        assert!(haversine_km(vienna, vienna).abs() < 1e-9);
    }
}
