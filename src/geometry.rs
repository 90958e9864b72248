//! Shared vector-geometry helpers for footprints and AOI coverage.
//!
//! All geometries are WGS84 lon/lat; areas are in square degrees, which is
//! what the coverage tolerances are calibrated against.

use geo::{Area, BooleanOps, BoundingRect};
use geo_types::{Coord, MultiPolygon, Polygon, Rect};
use wkt::TryFromWkt;

use crate::types::{S1Error, S1Result};

/// Parse a WGS84 polygon from its WKT representation
pub fn polygon_from_wkt(wkt_str: &str) -> S1Result<Polygon<f64>> {
    Polygon::try_from_wkt_str(wkt_str)
        .map_err(|e| S1Error::Geometry(format!("failed to parse WKT polygon: {}", e)))
}

/// Union of an arbitrary collection of polygons
pub fn union_all<'a, I>(polygons: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = &'a Polygon<f64>>,
{
    let mut union = MultiPolygon::new(vec![]);
    for polygon in polygons {
        union = union.union(&MultiPolygon::from(polygon.clone()));
    }
    union
}

/// Area of the intersection between the AOI and a (multi-)polygon,
/// in square degrees
pub fn aoi_intersection_area(aoi: &Polygon<f64>, geometry: &MultiPolygon<f64>) -> f64 {
    MultiPolygon::from(aoi.clone())
        .intersection(geometry)
        .unsigned_area()
}

/// Axis-aligned bounds of a polygon. Degenerate (empty) geometries
/// have no bounds.
pub fn bounds(polygon: &Polygon<f64>) -> Option<Rect<f64>> {
    polygon.bounding_rect()
}

/// Smallest rectangle containing both inputs
pub fn bounds_union(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

/// Expand a rectangle by `pad` on every side
pub fn pad_rect(rect: Rect<f64>, pad: f64) -> Rect<f64> {
    Rect::new(
        Coord {
            x: rect.min().x - pad,
            y: rect.min().y - pad,
        },
        Coord {
            x: rect.max().x + pad,
            y: rect.max().y + pad,
        },
    )
}

/// Rectangular expansion of a polygon's envelope by `pad` degrees
pub fn buffered_envelope(polygon: &Polygon<f64>, pad: f64) -> S1Result<Polygon<f64>> {
    let rect = bounds(polygon).ok_or_else(|| {
        S1Error::Geometry("cannot buffer a polygon without an envelope".to_string())
    })?;
    Ok(pad_rect(rect, pad).to_polygon())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo_types::polygon;

    fn unit_square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]
    }

    #[test]
    fn test_union_all_disjoint_squares() {
        let squares = [unit_square(0.0, 0.0, 1.0), unit_square(5.0, 5.0, 1.0)];
        let union = union_all(squares.iter());
        assert_relative_eq!(union.unsigned_area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_aoi_intersection_area_partial_overlap() {
        let aoi = unit_square(0.0, 0.0, 2.0);
        let footprint = union_all([unit_square(1.0, 0.0, 2.0)].iter());
        assert_relative_eq!(aoi_intersection_area(&aoi, &footprint), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pad_rect_is_isotropic() {
        let rect = Rect::new(Coord { x: 1.0, y: 2.0 }, Coord { x: 3.0, y: 5.0 });
        let padded = pad_rect(rect, 0.5);
        assert_relative_eq!(padded.min().x, 0.5);
        assert_relative_eq!(padded.min().y, 1.5);
        assert_relative_eq!(padded.max().x, 3.5);
        assert_relative_eq!(padded.max().y, 5.5);
    }

    #[test]
    fn test_polygon_from_wkt_roundtrip() {
        let polygon = polygon_from_wkt("POLYGON ((0 0, 2 0, 2 2, 0 2, 0 0))").unwrap();
        assert_relative_eq!(polygon.unsigned_area(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_polygon_from_invalid_wkt() {
        assert!(polygon_from_wkt("POINT (1 1)").is_err());
    }
}
