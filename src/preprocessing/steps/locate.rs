use image::DynamicImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::edges::canny;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use imageproc::rect::Rect;

/// Default minimum area (px^2) for a candidate receipt boundary
pub const DEFAULT_MIN_CONTOUR_AREA: f64 = 10_000.0;

/// Canny hysteresis thresholds
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;

/// Fraction of the contour perimeter used as the approximation epsilon
const APPROX_EPSILON_RATIO: f64 = 0.02;

/// A four-vertex polygon approximating the receipt boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quad {
    pub vertices: [Point<i32>; 4],
}

impl Quad {
    /// Axis-aligned bounding rectangle, clamped to an image of the given
    /// dimensions. The result always lies within the image and has
    /// positive extent.
    pub fn bounding_rect(&self, image_width: u32, image_height: u32) -> Rect {
        let xs = self.vertices.map(|p| p.x);
        let ys = self.vertices.map(|p| p.y);

        let min_x = xs.iter().min().copied().unwrap_or(0).max(0) as u32;
        let min_y = ys.iter().min().copied().unwrap_or(0).max(0) as u32;
        let max_x = (xs.iter().max().copied().unwrap_or(0).max(0) as u32)
            .min(image_width.saturating_sub(1));
        let max_y = (ys.iter().max().copied().unwrap_or(0).max(0) as u32)
            .min(image_height.saturating_sub(1));

        let min_x = min_x.min(max_x);
        let min_y = min_y.min(max_y);

        Rect::at(min_x as i32, min_y as i32)
            .of_size(max_x - min_x + 1, max_y - min_y + 1)
    }
}

/// Locate the receipt boundary in a resized frame.
///
/// Runs Canny edge detection on the grayscale frame, walks the external
/// contours in descending area order, and returns the first candidate whose
/// polygon approximation has exactly four vertices. `None` is an expected
/// outcome: the receipt may already fill the frame or its edges may be too
/// weak to trace.
pub fn apply(image: &DynamicImage, min_contour_area: f64) -> Option<Quad> {
    let gray = image.to_luma8();
    let edges = canny(&gray, CANNY_LOW, CANNY_HIGH);

    let mut contours: Vec<Contour<i32>> = find_contours(&edges)
        .into_iter()
        .filter(|c: &Contour<i32>| c.border_type == BorderType::Outer)
        .collect();
    contours.sort_by(|a, b| {
        contour_area(&b.points)
            .partial_cmp(&contour_area(&a.points))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for contour in &contours {
        let area = contour_area(&contour.points);
        if area < min_contour_area {
            tracing::trace!(area, "contour below area threshold, skipping");
            continue;
        }

        let perimeter = arc_length(&contour.points, true);
        let approx = approximate_polygon_dp(&contour.points, APPROX_EPSILON_RATIO * perimeter, true);
        if approx.len() == 4 {
            tracing::debug!(area, "receipt boundary located");
            return Some(Quad {
                vertices: [approx[0], approx[1], approx[2], approx[3]],
            });
        }
    }

    tracing::debug!("no qualifying rectangular contour found");
    None
}

/// Polygon area via the shoelace formula
fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0f64;
    let n = points.len();
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x as f64 * points[j].y as f64;
        area -= points[j].x as f64 * points[i].y as f64;
    }

    (area * 0.5).abs()
}
