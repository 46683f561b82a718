//! Point-in-polygon geofencing used to gate report submission to on-campus
//! locations.

use serde::{Deserialize, Serialize};

/// A geographic coordinate in WGS84 degrees.
///
/// Plain value type: latitude in [-90, 90], longitude in [-180, 180] for
/// real positions, but no range is enforced here — out-of-range or
/// non-finite values are legal inputs to [`Polygon::contains`] and simply
/// test as outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A simple (non-self-intersecting) boundary polygon over geographic
/// coordinates.
///
/// The vertex list is treated as cyclic: the last vertex connects back to
/// the first, so callers may supply the boundary either open or with the
/// first vertex repeated at the end — both forms describe the same region.
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: Vec<GeoPoint>,
}

impl Polygon {
    pub fn new(vertices: Vec<GeoPoint>) -> Self {
        Self { vertices }
    }

    /// Build a polygon from raw (latitude, longitude) pairs, e.g. from a
    /// config file.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self {
            vertices: pairs
                .iter()
                .map(|&(lat, lon)| GeoPoint::new(lat, lon))
                .collect(),
        }
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    /// Ray-casting / even-odd membership test.
    ///
    /// Walks every edge (consecutive vertex pairs, wrapping from the last
    /// vertex to the first) and toggles an inside flag whenever a ray cast
    /// from the query point crosses that edge. The crossing test uses a
    /// half-open interval on the longitude axis (`>` on one endpoint, `>=`
    /// implied by negation on the other) so an edge shared between two
    /// vertices is never counted twice.
    ///
    /// Total function: never panics. NaN or infinite coordinates fail every
    /// comparison and test as outside. A polygon with fewer than 3 vertices
    /// contains nothing.
    ///
    /// Exact-boundary points get whatever the half-open convention yields;
    /// the result is deterministic but one convention among several (e.g.
    /// the corner (0,0) of the unit square tests as inside). No epsilon
    /// tolerance is applied.
    pub fn contains(&self, point: GeoPoint) -> bool {
        if self.vertices.len() < 3 {
            return false;
        }

        let x = point.latitude;
        let y = point.longitude;
        let mut inside = false;

        let mut j = self.vertices.len() - 1;
        for i in 0..self.vertices.len() {
            let xi = self.vertices[i].latitude;
            let yi = self.vertices[i].longitude;
            let xj = self.vertices[j].latitude;
            let yj = self.vertices[j].longitude;

            let crosses =
                ((yi > y) != (yj > y)) && x < (xj - xi) * (y - yi) / (yj - yi) + xi;
            if crosses {
                inside = !inside;
            }
            j = i;
        }

        inside
    }

    /// The campus boundary the backend was deployed for. Used when no
    /// boundary is configured.
    pub fn campus_default() -> Self {
        Self::from_pairs(&[
            (19.022028, 72.869722),
            (19.021528, 72.872333),
            (19.0211667, 72.8722222),
            (19.020861, 72.871222),
            (19.0205556, 72.8705556),
            (19.020833, 72.869556),
        ])
    }
}
