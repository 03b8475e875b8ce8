//! Sector polygon construction.
//!
//! Uses a flat equirectangular approximation: one fixed meters-per-degree
//! constant for latitude, and one for longitude scaled by cos(latitude) to
//! correct for meridian convergence. Accurate enough for the local radii
//! involved (tens to hundreds of meters); no geodesic math.

/// Meters per degree of latitude.
const LAT_METERS_PER_DEG: f64 = 110_540.0;

/// Meters per degree of longitude at the equator.
const LON_METERS_PER_DEG: f64 = 111_320.0;

/// Number of segments used to trace the arc edge.
const ARC_SEGMENTS: usize = 20;

/// Build the closed outline of a pie-slice sector centered on (`lon`, `lat`):
/// the center point, 21 samples along the arc edge, then the center again.
///
/// `azimuth` is a compass bearing (0 = North, clockwise); the arc spans
/// `azimuth ± beam/2`. All coordinates are rounded to 6 decimal places.
pub fn sector_outline(lon: f64, lat: f64, azimuth: f64, radius_m: f64, beam_deg: f64) -> Vec<(f64, f64)> {
    let radius_lat_deg = radius_m / LAT_METERS_PER_DEG;
    let radius_lon_deg = radius_m / (LON_METERS_PER_DEG * lat.to_radians().cos());

    let step = beam_deg / ARC_SEGMENTS as f64;
    let start = azimuth - beam_deg / 2.0;

    let mut points = Vec::with_capacity(ARC_SEGMENTS + 3);
    points.push((round6(lon), round6(lat)));

    for i in 0..=ARC_SEGMENTS {
        let compass = start + i as f64 * step;
        // Compass bearing (North=0, clockwise) to math angle (East=0, counter-clockwise)
        let angle = (90.0 - compass).to_radians();
        let dx = radius_lon_deg * angle.cos();
        let dy = radius_lat_deg * angle.sin();
        points.push((round6(lon + dx), round6(lat + dy)));
    }

    points.push((round6(lon), round6(lat)));
    points
}

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}
