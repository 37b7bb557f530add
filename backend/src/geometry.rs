use crate::models::Coordinate;

const EARTH_RADIUS_KM: f64 = 6_371.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Deliberately loose envelope around Morocco. Anything inside is accepted
/// as-is; there is no land/sea or distance-to-track test.
pub const NETWORK_BOUNDS: BoundingBox = BoundingBox {
    min_lat: 27.0,
    max_lat: 37.0,
    min_lon: -18.0,
    max_lon: -0.5,
};

impl BoundingBox {
    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.lat >= self.min_lat
            && coord.lat <= self.max_lat
            && coord.lon >= self.min_lon
            && coord.lon <= self.max_lon
    }
}

/// Deterministic marker offset: a point on a circle of radius `variation`
/// whose angle is driven by the incident's unique factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    pub variation: f64,
    pub angle_step: f64,
}

impl Jitter {
    /// ~50 m, for markers sitting on a station.
    pub const STATION: Jitter = Jitter {
        variation: 0.0005,
        angle_step: 0.1,
    };
    pub const CORRIDOR: Jitter = Jitter {
        variation: 0.0005,
        angle_step: 0.2,
    };
    /// ~10 m, for points interpolated between two stations.
    pub const LINE: Jitter = Jitter {
        variation: 0.0001,
        angle_step: 0.2,
    };
    /// ~100 m, for incidents spread over the network.
    pub const SPREAD: Jitter = Jitter {
        variation: 0.001,
        angle_step: 0.1,
    };

    pub fn offset(self, unique_factor: i64) -> Coordinate {
        let angle = unique_factor as f64 * self.angle_step;
        Coordinate {
            lat: angle.sin() * self.variation,
            lon: angle.cos() * self.variation,
        }
    }

    pub fn apply(self, base: Coordinate, unique_factor: i64) -> Coordinate {
        let offset = self.offset(unique_factor);
        Coordinate {
            lat: base.lat + offset.lat,
            lon: base.lon + offset.lon,
        }
    }
}

/// Fraction along a segment derived from the incident's unique factor.
pub fn spread_fraction(unique_factor: i64) -> f64 {
    unique_factor.rem_euclid(100) as f64 / 100.0
}

/// Point at `ratio` (0..1) of the polyline, measured in vertex steps rather
/// than distance.
pub fn point_along_polyline(points: &[Coordinate], ratio: f64) -> Option<Coordinate> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return Some(*first);
    }
    let scaled = ratio.clamp(0.0, 1.0) * (points.len() - 1) as f64;
    let index = scaled.floor() as usize;
    if index >= points.len() - 1 {
        return points.last().copied();
    }
    Some(points[index].interpolate(points[index + 1], scaled.fract()))
}

pub fn approximate_distance_km(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| haversine_km(w[0], w[1])).sum()
}

pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
