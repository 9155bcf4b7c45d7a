//! Extent reprojection for the capabilities bounding-box fallback.

use geo::Rect;
use proj::Proj;

use crate::error::{OwsError, Result};
use geobasket_core::models::BoundingBox;

/// Reproject an axis-aligned extent between two CRS.
///
/// All four corners are transformed and the returned extent is their
/// axis-aligned hull, which is the usual approximation for capabilities
/// extents.
pub fn reproject_extent(extent: [f64; 4], from: &str, to: &str) -> Result<[f64; 4]> {
    if from == to {
        return Ok(extent);
    }

    let proj = Proj::new_known_crs(from, to, None).map_err(|e| OwsError::Projection {
        from: from.to_string(),
        to: to.to_string(),
        reason: e.to_string(),
    })?;

    let rect = Rect::new(
        geo::coord! { x: extent[0], y: extent[1] },
        geo::coord! { x: extent[2], y: extent[3] },
    );
    let corners = [
        (rect.min().x, rect.min().y),
        (rect.min().x, rect.max().y),
        (rect.max().x, rect.min().y),
        (rect.max().x, rect.max().y),
    ];

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for corner in corners {
        let (x, y) = proj.convert(corner).map_err(|e| OwsError::Projection {
            from: from.to_string(),
            to: to.to_string(),
            reason: e.to_string(),
        })?;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    Ok([min_x, min_y, max_x, max_y])
}

/// Reproject a lon/lat (EPSG:4326) extent into the given SRS
pub fn latlon_extent_to_srs(extent: [f64; 4], srs: &str) -> Result<BoundingBox> {
    let projected = reproject_extent(extent, "EPSG:4326", srs)?;
    Ok(BoundingBox::new(srs, projected))
}
