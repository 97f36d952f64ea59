use crate::geometry::Size;

/// Offsets of the grid lines along one axis: `spacing * (i + 0.5)` for every
/// `i < extent / spacing`.
pub fn grid_line_offsets(extent: f32, spacing: f32) -> impl Iterator<Item = f32> {
    let count = if spacing > 0.0 && extent > 0.0 {
        (extent / spacing).ceil() as usize
    } else {
        0
    };
    (0..count).map(move |i| spacing * (i as f32 + 0.5))
}

/// Generate SVG path commands for grid lines
///
/// The grid is static: it covers the component and does not follow pan or
/// zoom.
///
/// # Returns
/// SVG path commands string (e.g., "M 0 9 L 100 9 M 0 27 L 100 27 ... M 9 0 L 9 100 ...")
pub fn generate_grid_commands(size: Size, spacing: f32) -> String {
    let mut commands = String::new();

    for y in grid_line_offsets(size.height, spacing) {
        if !commands.is_empty() {
            commands.push(' ');
        }
        commands.push_str(&format!("M 0 {} L {} {}", y, size.width, y));
    }

    for x in grid_line_offsets(size.width, spacing) {
        if !commands.is_empty() {
            commands.push(' ');
        }
        commands.push_str(&format!("M {} 0 L {} {}", x, x, size.height));
    }

    commands
}
