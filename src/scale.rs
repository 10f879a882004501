//! Linear projection from real-world coordinates to canvas pixels,
//! plus the static grid drawn once at startup.

use crate::config::VizConfig;
use crate::surface::DrawSurface;

/// Maps values from a source domain onto an output range linearly.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// Create a scale mapping `domain` onto `range`.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Project a domain value onto the range.
    ///
    /// A degenerate (zero-width) domain maps everything to the range start.
    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (value - d0) * (r1 - r0) / (d1 - d0)
    }
}

/// Draw the static grid onto the surface, one line pair per
/// `grid_spacing` step across the coordinate domain.
pub fn draw_grid<S: DrawSurface>(surface: &mut S, config: &VizConfig) {
    let x_scale = LinearScale::new(
        (config.domain_min, config.domain_max),
        (0.0, config.canvas_width),
    );
    let y_scale = LinearScale::new(
        (config.domain_min, config.domain_max),
        (0.0, config.canvas_height),
    );

    let mut j = config.domain_min;
    while j < config.domain_max {
        surface.grid_line(
            x_scale.scale(config.domain_min),
            y_scale.scale(j),
            x_scale.scale(config.domain_max),
            y_scale.scale(j),
        );
        surface.grid_line(
            x_scale.scale(j),
            y_scale.scale(config.domain_min),
            x_scale.scale(j),
            y_scale.scale(config.domain_max),
        );
        j += config.grid_spacing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn test_scale_endpoints_and_midpoint() {
        let scale = LinearScale::new((-4500.0, 4500.0), (0.0, 500.0));
        assert_eq!(scale.scale(-4500.0), 0.0);
        assert_eq!(scale.scale(4500.0), 500.0);
        assert_eq!(scale.scale(0.0), 250.0);
    }

    #[test]
    fn test_scale_extrapolates_outside_domain() {
        let scale = LinearScale::new((0.0, 100.0), (0.0, 10.0));
        assert_eq!(scale.scale(200.0), 20.0);
        assert_eq!(scale.scale(-50.0), -5.0);
    }

    #[test]
    fn test_degenerate_domain_maps_to_range_start() {
        let scale = LinearScale::new((5.0, 5.0), (0.0, 10.0));
        assert_eq!(scale.scale(123.0), 0.0);
    }

    #[test]
    fn test_grid_line_count() {
        let config = VizConfig::default();
        let mut surface = RecordingSurface::default();
        draw_grid(&mut surface, &config);
        // 9000 cm of domain at 500 cm spacing: 18 steps, two lines each.
        assert_eq!(surface.grid_lines, 36);
    }
}
