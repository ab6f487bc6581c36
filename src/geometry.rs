//! Bounding-box geometry grammar.
//!
//! The codec-level size convention: `WxH` with an optional trailing fit
//! modifier. Either axis may be omitted (`"400"`, `"x300"`); the missing axis
//! follows the source aspect ratio.
//!
//! | Modifier | Meaning |
//! |----------|---------|
//! | _(none)_ | scale to fit within the box, preserving aspect ratio |
//! | `>` | fit within, but only shrink — never enlarge |
//! | `<` | fit within, but only enlarge — never shrink |
//! | `!` | exact dimensions, aspect ratio ignored |
//! | `^` | cover the box: smallest size with both axes ≥ the bounds |
//! | `%` | values are percentages of the source dimensions |
//!
//! Fit results are rounded and clamped to ≥ 1 per axis, so a degenerate
//! input such as `"1x0"` still yields a drawable size.

use crate::resolve::Dimensions;
use crate::size_spec::SpecError;

/// How the parsed bounds are applied to the source dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    #[default]
    Fit,
    ShrinkOnly,
    EnlargeOnly,
    Exact,
    Fill,
    Percent,
}

/// A parsed geometry spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub modifier: Modifier,
}

impl Geometry {
    /// Parse a geometry string. At least one axis must be present.
    pub fn parse(spec: &str) -> Result<Self, SpecError> {
        let invalid = || SpecError::InvalidSizeSpec(format!("unparseable geometry {spec:?}"));

        let (body, modifier) = match spec.chars().last() {
            Some('>') => (&spec[..spec.len() - 1], Modifier::ShrinkOnly),
            Some('<') => (&spec[..spec.len() - 1], Modifier::EnlargeOnly),
            Some('!') => (&spec[..spec.len() - 1], Modifier::Exact),
            Some('^') => (&spec[..spec.len() - 1], Modifier::Fill),
            Some('%') => (&spec[..spec.len() - 1], Modifier::Percent),
            _ => (spec, Modifier::Fit),
        };

        let parse_axis = |s: &str| -> Result<Option<u32>, SpecError> {
            if s.is_empty() {
                Ok(None)
            } else {
                s.parse().map(Some).map_err(|_| invalid())
            }
        };

        let (width, height) = match body.split_once('x') {
            Some((w, h)) => (parse_axis(w)?, parse_axis(h)?),
            None => (parse_axis(body)?, None),
        };

        if width.is_none() && height.is_none() {
            return Err(invalid());
        }
        Ok(Self {
            width,
            height,
            modifier,
        })
    }

    /// Compute the target dimensions for a source image, preserving aspect
    /// ratio except under `!`. Both axes of the result are ≥ 1.
    pub fn fit(&self, src: Dimensions) -> Dimensions {
        let sw = src.width as f64;
        let sh = src.height as f64;

        let (w, h) = match self.modifier {
            Modifier::Exact => (
                self.width.unwrap_or(src.width) as f64,
                self.height.unwrap_or(src.height) as f64,
            ),
            Modifier::Percent => {
                let pw = self.width.map(|v| v as f64 / 100.0);
                let ph = self.height.map(|v| v as f64 / 100.0);
                // A single percentage applies to both axes.
                let pw = pw.or(ph).unwrap_or(1.0);
                let ph = ph.unwrap_or(pw);
                (sw * pw, sh * ph)
            }
            Modifier::Fit | Modifier::ShrinkOnly | Modifier::EnlargeOnly | Modifier::Fill => {
                let rx = self.width.map(|w| w as f64 / sw);
                let ry = self.height.map(|h| h as f64 / sh);
                let scale = match (rx, ry) {
                    (Some(a), Some(b)) if self.modifier == Modifier::Fill => a.max(b),
                    (Some(a), Some(b)) => a.min(b),
                    (Some(a), None) => a,
                    (None, Some(b)) => b,
                    (None, None) => 1.0,
                };
                let scale = match self.modifier {
                    Modifier::ShrinkOnly => scale.min(1.0),
                    Modifier::EnlargeOnly => scale.max(1.0),
                    _ => scale,
                };
                (sw * scale, sh * scale)
            }
        };

        Dimensions {
            width: round_axis(w),
            height: round_axis(h),
        }
    }
}

/// Round to the nearest pixel, never below 1.
fn round_axis(v: f64) -> u32 {
    (v.round().max(1.0)) as u32
}
