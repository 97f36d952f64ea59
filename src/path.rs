use crate::config::{ConnectionType, Direction};
use crate::geometry::Vector2d;

/// Stroke width of a connection at the given zoom.
pub fn stroke_width(zoom: f32) -> f32 {
    3.0 * zoom
}

/// Cubic bezier of a connection, from the output anchor to the input anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub p0: Vector2d, // Output anchor
    pub p1: Vector2d,
    pub p2: Vector2d,
    pub p3: Vector2d, // Input anchor
}

impl CubicBezier {
    /// Control arms are horizontal, at least `anchors_length` long, and grow
    /// with the horizontal distance (`|dx| / 1.5`). In the default direction
    /// the arm leaves the output towards the west and enters the input from
    /// the east.
    pub fn for_connection(
        output: Vector2d,
        input: Vector2d,
        anchors_length: f32,
        direction: Direction,
    ) -> Self {
        let dx = ((output.x - input.x).abs() / 1.5).max(anchors_length) * direction.anchor_sign();
        CubicBezier {
            p0: output,
            p1: Vector2d::new(output.x - dx, output.y),
            p2: Vector2d::new(input.x + dx, input.y),
            p3: input,
        }
    }

    /// Evaluate the bezier curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f32) -> Vector2d {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * self.p0.x + 3.0 * mt2 * t * self.p1.x + 3.0 * mt * t2 * self.p2.x + t3 * self.p3.x;
        let y = mt3 * self.p0.y + 3.0 * mt2 * t * self.p1.y + 3.0 * mt * t2 * self.p2.y + t3 * self.p3.y;

        Vector2d::new(x, y)
    }

    /// `"M x0 y0 C x1 y1, x2 y2, x3 y3"`
    pub fn to_svg(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.p0.x, self.p0.y, self.p1.x, self.p1.y, self.p2.x, self.p2.y, self.p3.x, self.p3.y
        )
    }
}

/// SVG path command for a connection between two anchors.
///
/// # Arguments
/// * `output`, `input` - Anchor positions in editor space
/// * `connection_type` - Bezier curve or straight line
/// * `anchors_length` - Minimum bezier arm length
/// * `direction` - Which side inputs are drawn on
pub fn connection_path(
    output: Vector2d,
    input: Vector2d,
    connection_type: ConnectionType,
    anchors_length: f32,
    direction: Direction,
) -> String {
    match connection_type {
        ConnectionType::Bezier => CubicBezier::for_connection(output, input, anchors_length, direction).to_svg(),
        ConnectionType::Linear => format!("M {} {} L {} {}", output.x, output.y, input.x, input.y),
    }
}

/// Squared distance from a point to a line segment
fn distance_to_line_segment_sq(point: Vector2d, a: Vector2d, b: Vector2d) -> f32 {
    let ab = b - a;
    let ap = point - a;

    let ab_len_sq = ab.x * ab.x + ab.y * ab.y;

    if ab_len_sq < f32::EPSILON {
        // Degenerate segment (a == b)
        return ap.x * ap.x + ap.y * ap.y;
    }

    // Project point onto line, clamped to segment
    let t = ((ap.x * ab.x + ap.y * ab.y) / ab_len_sq).clamp(0.0, 1.0);
    let closest = Vector2d::new(a.x + t * ab.x, a.y + t * ab.y);

    let d = point - closest;
    d.x * d.x + d.y * d.y
}

pub fn distance_to_segment(point: Vector2d, a: Vector2d, b: Vector2d) -> f32 {
    distance_to_line_segment_sq(point, a, b).sqrt()
}

/// Minimum distance from a point to a cubic bezier curve
///
/// The curve is flattened into `num_samples` segments (0 means 20).
pub fn distance_to_bezier(point: Vector2d, bezier: &CubicBezier, num_samples: usize) -> f32 {
    let num_samples = if num_samples == 0 { 20 } else { num_samples };

    let mut min_dist_sq = f32::MAX;
    let mut prev_point = bezier.eval(0.0);

    for i in 1..=num_samples {
        let t = i as f32 / num_samples as f32;
        let curr_point = bezier.eval(t);

        let dist_sq = distance_to_line_segment_sq(point, prev_point, curr_point);
        if dist_sq < min_dist_sq {
            min_dist_sq = dist_sq;
        }

        prev_point = curr_point;
    }

    min_dist_sq.sqrt()
}
