//! Viewport sizing: turn a page's natural size and the caller's scale options
//! into the final render scale.
//!
//! ## Shrink-only fitting
//!
//! Large scale factors on large pages can ask for surfaces far beyond what an
//! image decoder (or a browser canvas) will accept. When any of
//! `max_width`, `max_height` or `scale_for_browser_support` is set, the scale
//! is reduced until the viewport fits inside the bounds, keeping the aspect
//! ratio. It is never increased past the requested scale.

use serde::{Deserialize, Serialize};

/// Fallback bound for whichever maximum dimension is unset.
pub const DEFAULT_MAX_DIMENSION: f32 = 4096.0;

/// A page's natural size in PDF points (scale 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// The pixel-space rectangle a page is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl Viewport {
    /// The viewport of `size` at `scale`.
    pub fn at_scale(size: PageSize, scale: f32) -> Self {
        Self {
            width: size.width * scale,
            height: size.height * scale,
            scale,
        }
    }

    /// Integer surface dimensions: truncated, never below one pixel.
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |v: f32| (v.floor() as u32).max(1);
        (px(self.width), px(self.height))
    }
}

/// Scale-related rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleOptions {
    pub scale: f32,
    pub max_width: Option<f32>,
    pub max_height: Option<f32>,
    pub scale_for_browser_support: bool,
}

impl ScaleOptions {
    fn is_capped(&self) -> bool {
        self.scale_for_browser_support || self.max_width.is_some() || self.max_height.is_some()
    }
}

/// Compute the scale to render a page of `natural` size with.
pub fn compute_scale(natural: PageSize, opts: &ScaleOptions) -> f32 {
    if !opts.is_capped() {
        return opts.scale;
    }

    let requested = Viewport::at_scale(natural, opts.scale);
    let max_width = opts.max_width.unwrap_or(DEFAULT_MAX_DIMENSION);
    let max_height = opts.max_height.unwrap_or(DEFAULT_MAX_DIMENSION);

    let width_factor = max_width / requested.width;
    let height_factor = max_height / requested.height;
    // Degenerate (zero-sized) pages give infinite factors; the 1.0 cap absorbs them.
    let safe_factor = width_factor.min(height_factor).min(1.0);

    opts.scale * safe_factor
}

/// The viewport to render `natural` into under `opts`.
pub fn fit_viewport(natural: PageSize, opts: &ScaleOptions) -> Viewport {
    Viewport::at_scale(natural, compute_scale(natural, opts))
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
    };

    fn opts(scale: f32) -> ScaleOptions {
        ScaleOptions {
            scale,
            max_width: None,
            max_height: None,
            scale_for_browser_support: false,
        }
    }

    #[test]
    fn unchanged_without_caps() {
        for size in [
            A4,
            PageSize { width: 10_000.0, height: 20_000.0 },
            PageSize { width: 1.0, height: 1.0 },
        ] {
            for scale in [0.5, 1.0, 3.0, 40.0] {
                assert_eq!(compute_scale(size, &opts(scale)), scale);
            }
        }
    }

    #[test]
    fn within_bounds_is_not_upscaled() {
        let o = ScaleOptions {
            max_width: Some(5000.0),
            max_height: Some(5000.0),
            ..opts(2.0)
        };
        assert_eq!(compute_scale(A4, &o), 2.0);
    }

    #[test]
    fn shrinks_to_max_width() {
        let o = ScaleOptions {
            max_width: Some(595.0),
            ..opts(3.0)
        };
        let s = compute_scale(A4, &o);
        assert!((s - 1.0).abs() < 1e-6, "got {s}");
        let vp = fit_viewport(A4, &o);
        assert!(vp.width <= 595.0 + 1e-3);
    }

    #[test]
    fn tighter_dimension_wins() {
        let o = ScaleOptions {
            max_width: Some(10_000.0),
            max_height: Some(421.0),
            ..opts(1.0)
        };
        let s = compute_scale(A4, &o);
        assert!((s - 0.5).abs() < 1e-6, "got {s}");
    }

    #[test]
    fn browser_support_uses_default_cap() {
        let o = ScaleOptions {
            scale_for_browser_support: true,
            ..opts(10.0)
        };
        let vp = fit_viewport(A4, &o);
        assert!(vp.height <= DEFAULT_MAX_DIMENSION + 1e-2, "got {vp:?}");
        assert!(vp.scale < 10.0);
        // Aspect ratio preserved.
        let ratio = vp.width / vp.height;
        assert!((ratio - A4.width / A4.height).abs() < 1e-4);
    }

    #[test]
    fn one_max_set_defaults_the_other() {
        let tall = PageSize { width: 100.0, height: 10_000.0 };
        let o = ScaleOptions {
            max_width: Some(1_000.0),
            ..opts(1.0)
        };
        let vp = fit_viewport(tall, &o);
        assert!(vp.height <= DEFAULT_MAX_DIMENSION + 1e-2);
    }

    #[test]
    fn shrink_only_property() {
        let sizes = [
            A4,
            PageSize { width: 3000.0, height: 200.0 },
            PageSize { width: 50.0, height: 50.0 },
        ];
        for size in sizes {
            for scale in [0.25, 1.0, 4.0, 16.0] {
                let o = ScaleOptions {
                    max_width: Some(800.0),
                    max_height: Some(600.0),
                    ..opts(scale)
                };
                let s = compute_scale(size, &o);
                assert!(s <= scale);
                let requested = Viewport::at_scale(size, scale);
                if requested.width <= 800.0 && requested.height <= 600.0 {
                    assert_eq!(s, scale);
                }
            }
        }
    }

    #[test]
    fn pixel_size_truncates_and_clamps() {
        let vp = Viewport { width: 99.9, height: 0.2, scale: 1.0 };
        assert_eq!(vp.pixel_size(), (99, 1));
    }
}
