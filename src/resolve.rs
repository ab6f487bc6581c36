//! Pure size resolution.
//!
//! Maps a [`SizeSpec`] plus the source image's current dimensions to a target
//! size and a resize mode. No I/O, no pixels — everything here is a pure
//! function, safe to call concurrently from independent resize requests.

use crate::geometry::Geometry;
use crate::size_spec::{SizeSpec, SpecError};

/// Integer pixel dimensions. Resolved targets always have both axes ≥ 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn clamped(self) -> Self {
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
        }
    }
}

/// Fractional dimensions from proportional scaling.
///
/// Kept as f64 so the codec decides final rasterization; [`Scaled::rounded`]
/// converts when an integer size is needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaled {
    pub width: f64,
    pub height: f64,
}

impl Scaled {
    /// Nearest-pixel dimensions, clamped to ≥ 1 per axis.
    pub fn rounded(self) -> Dimensions {
        Dimensions {
            width: self.width.round().max(1.0) as u32,
            height: self.height.round().max(1.0) as u32,
        }
    }
}

impl From<Dimensions> for Scaled {
    fn from(d: Dimensions) -> Self {
        Self {
            width: d.width as f64,
            height: d.height as f64,
        }
    }
}

/// How the codec should reach the resolved target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeMode {
    /// Straight resize to the target (codec thumbnail convention).
    Thumbnail,
    /// Center-crop to the target aspect ratio, then resize to the target.
    Crop,
    /// Resize to `scaled`, then composite centered on a background-filled
    /// canvas of the target size.
    ScaleAndPad { scaled: Scaled },
    /// Target computed from a geometry spec; resize to it directly.
    Geometry,
}

/// A resolved resize request: exact target dimensions plus the mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTarget {
    pub target: Dimensions,
    pub mode: ResizeMode,
}

/// Resolve a size spec against the source image's current dimensions.
///
/// Deterministic and side-effect free. The only failure is a
/// [`SizeSpec::GeometryFit`] string the geometry grammar rejects.
pub fn resolve(spec: &SizeSpec, current: Dimensions) -> Result<ResolvedTarget, SpecError> {
    let resolved = match *spec {
        SizeSpec::Square(n) => ResolvedTarget {
            target: Dimensions::new(n, n).clamped(),
            mode: ResizeMode::Thumbnail,
        },
        SizeSpec::Explicit(w, h) => ResolvedTarget {
            target: Dimensions::new(w, h).clamped(),
            mode: ResizeMode::Thumbnail,
        },
        SizeSpec::Crop(w, h) => ResolvedTarget {
            target: Dimensions::new(w, h).clamped(),
            mode: ResizeMode::Crop,
        },
        SizeSpec::ScaleFit(max_w, max_h) => {
            // The bound is chosen by whichever source axis is larger, not by
            // matching axes. Kept bug-for-bug compatible with the processor
            // this replaces.
            let bound = if current.height > current.width {
                max_h
            } else {
                max_w
            };
            ResolvedTarget {
                target: Dimensions::new(max_w, max_h).clamped(),
                mode: ResizeMode::ScaleAndPad {
                    scaled: proportional_scale(current, bound),
                },
            }
        }
        SizeSpec::GeometryFit(ref g) => ResolvedTarget {
            target: Geometry::parse(g)?.fit(current),
            mode: ResizeMode::Geometry,
        },
    };
    Ok(resolved)
}

/// Proportional downscale so the longer axis equals `max_size`.
///
/// Images already smaller than the bound on both axes are returned unchanged —
/// no upscaling. When height equals width, height drives the scale.
pub fn proportional_scale(dims: Dimensions, max_size: u32) -> Scaled {
    if dims.height < max_size && dims.width < max_size {
        return dims.into();
    }
    let max = max_size as f64;
    if dims.height >= dims.width {
        Scaled {
            height: max,
            width: dims.width as f64 * max / dims.height as f64,
        }
    } else {
        Scaled {
            width: max,
            height: dims.height as f64 * max / dims.width as f64,
        }
    }
}
