use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;

use crate::error::Result;
use crate::models::Contour;
use crate::raster::{PixelLayout, RasterBuffer};

/// Trace the outer boundary of every top-level foreground region.
///
/// Any non-zero pixel counts as foreground. Borders are found with Suzuki-Abe
/// border following (8-connectivity); holes, and shapes sitting inside holes,
/// are not reported. Each contour is compressed to the end points of its
/// straight horizontal, vertical and diagonal runs.
///
/// Contours come out in raster-scan order of their first pixel, which makes
/// the result deterministic for a given buffer.
pub fn trace_external_contours(binary: &RasterBuffer) -> Result<Vec<Contour>> {
    binary.ensure_layout("contour tracing", &[PixelLayout::Luma])?;
    let gray = binary.to_gray_image()?;

    let contours = find_contours::<u32>(&gray)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour::new(compress_straight_runs(c.points)))
        .collect();

    Ok(contours)
}

/// Drop every point that continues the step direction of its predecessor.
///
/// Treats the points as a closed polygon, so the run wrapping around from the
/// last point back to the first is compressed as well.
pub fn compress_straight_runs(points: Vec<Point<u32>>) -> Vec<Point<u32>> {
    let n = points.len();
    if n < 3 {
        return points;
    }

    let direction = |from: Point<u32>, to: Point<u32>| {
        (
            (to.x as i64 - from.x as i64).signum(),
            (to.y as i64 - from.y as i64).signum(),
        )
    };

    let kept: Vec<Point<u32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let curr = points[i];
            let next = points[(i + 1) % n];
            direction(prev, curr) != direction(curr, next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        // every point was collinear with its neighbours; keep an anchor
        vec![points[0]]
    } else {
        kept
    }
}
