//! Physical units <-> pixel space
//!
//! A [`LinearScale`] per axis maps `[domain_min, domain_max]` onto a pixel
//! range. The y scale runs bottom-to-top because pixel rows grow downward
//! while physical "up" is positive.

use crate::error::{SimError, SimResult};
use crate::simulation::states::NVec2;

/// Viewport size plus the physical bounds plotted inside it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportGeometry {
    pub width_px: f64,
    pub height_px: f64,
    pub margin_px: f64, // inset on every side for axes and labels
    pub x_domain: (f64, f64),
    pub y_domain: (f64, f64),
}

impl ViewportGeometry {
    pub fn new(width_px: f64, height_px: f64, margin_px: f64) -> Self {
        Self {
            width_px,
            height_px,
            margin_px,
            x_domain: (0.0, 1.0),
            y_domain: (0.0, 1.0),
        }
    }

    pub fn with_domain(mut self, x_domain: (f64, f64), y_domain: (f64, f64)) -> Self {
        self.x_domain = x_domain;
        self.y_domain = y_domain;
        self
    }

    /// Widen the shorter domain so one metre is the same length on both axes
    pub fn equal_aspect(mut self) -> Self {
        let inner_w = self.width_px - 2.0 * self.margin_px;
        let inner_h = self.height_px - 2.0 * self.margin_px;
        let (x0, x1) = self.x_domain;
        let (y0, y1) = self.y_domain;
        if !(inner_w > 0.0 && inner_h > 0.0 && x1 > x0 && y1 > y0) {
            return self;
        }
        let sx = inner_w / (x1 - x0);
        let sy = inner_h / (y1 - y0);
        if sx < sy {
            let half = 0.5 * inner_h / sx;
            let mid = 0.5 * (y0 + y1);
            self.y_domain = (mid - half, mid + half);
        } else {
            let half = 0.5 * inner_w / sy;
            let mid = 0.5 * (x0 + x1);
            self.x_domain = (mid - half, mid + half);
        }
        self
    }
}

/// Affine map from a value domain onto a pixel range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(axis: &'static str, domain: (f64, f64), range: (f64, f64)) -> SimResult<Self> {
        let (d0, d1) = domain;
        if !(d0.is_finite() && d1.is_finite()) || d1 <= d0 {
            return Err(SimError::DegenerateDomain { axis, min: d0, max: d1 });
        }
        Ok(Self { domain, range })
    }

    /// pixel = (value - d0) / (d1 - d0) * (r1 - r0) + r0
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        (value - d0) / (d1 - d0) * (r1 - r0) + r0
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        (pixel - r0) / (r1 - r0) * (d1 - d0) + d0
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.domain.0, self.domain.1)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.domain.0 && value <= self.domain.1
    }

    /// Pixels per domain unit, always positive
    pub fn factor(&self) -> f64 {
        ((self.range.1 - self.range.0) / (self.domain.1 - self.domain.0)).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    geometry: ViewportGeometry,
    x: LinearScale,
    y: LinearScale,
}

impl CoordinateMapper {
    pub fn new(geometry: ViewportGeometry) -> SimResult<Self> {
        let ViewportGeometry { width_px, height_px, margin_px, .. } = geometry;
        let sane = width_px.is_finite() && height_px.is_finite() && margin_px.is_finite() && margin_px >= 0.0;
        if !sane || width_px <= 2.0 * margin_px || height_px <= 2.0 * margin_px {
            return Err(SimError::InvalidViewport {
                width: width_px,
                height: height_px,
                margin: margin_px,
            });
        }

        let x = LinearScale::new("x", geometry.x_domain, (margin_px, width_px - margin_px))?;
        // y inverted: domain min at the bottom edge
        let y = LinearScale::new("y", geometry.y_domain, (height_px - margin_px, margin_px))?;

        Ok(Self { geometry, x, y })
    }

    pub fn geometry(&self) -> &ViewportGeometry {
        &self.geometry
    }

    pub fn x_scale(&self) -> &LinearScale {
        &self.x
    }

    pub fn y_scale(&self) -> &LinearScale {
        &self.y
    }

    pub fn to_pixel(&self, p: NVec2) -> NVec2 {
        NVec2::new(self.x.apply(p.x), self.y.apply(p.y))
    }

    pub fn to_physical(&self, px: NVec2) -> NVec2 {
        NVec2::new(self.x.invert(px.x), self.y.invert(px.y))
    }

    /// Clamp into the domain first, so the result always lies inside the plot
    pub fn to_pixel_clamped(&self, p: NVec2) -> NVec2 {
        self.to_pixel(NVec2::new(self.x.clamp(p.x), self.y.clamp(p.y)))
    }

    pub fn contains(&self, p: NVec2) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y)
    }

    /// Physical length along x in pixels (radii, arrow lengths)
    pub fn length_to_px(&self, length: f64) -> f64 {
        length * self.x.factor()
    }

    /// Top-left and bottom-right corners of the plot area
    pub fn plot_area(&self) -> (NVec2, NVec2) {
        let m = self.geometry.margin_px;
        (
            NVec2::new(m, m),
            NVec2::new(self.geometry.width_px - m, self.geometry.height_px - m),
        )
    }
}
