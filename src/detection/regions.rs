use crate::models::{BoundingBox, Contour};

/// Smallest axis-aligned box enclosing a contour, or `None` for an empty one.
///
/// The box's max edge is one past the right-most / bottom-most point, so a
/// single-pixel contour gives a 1x1 box.
pub fn bounding_box(contour: &Contour) -> Option<BoundingBox> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

    for p in &contour.points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Some(BoundingBox {
        min_x,
        min_y,
        max_x: max_x + 1,
        max_y: max_y + 1,
    })
}

/// Whether a box is larger than `min_dim` on both axes
pub fn exceeds_min_dim(bbox: &BoundingBox, min_dim: u32) -> bool {
    bbox.width() > min_dim && bbox.height() > min_dim
}

/// Bound every contour and keep the boxes strictly larger than `min_dim`
/// on both axes, in input order.
pub fn filter_regions(contours: &[Contour], min_dim: u32) -> Vec<BoundingBox> {
    contours
        .iter()
        .filter_map(bounding_box)
        .filter(|bbox| exceeds_min_dim(bbox, min_dim))
        .collect()
}
