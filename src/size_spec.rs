//! Size specifier parsing.
//!
//! Attachment configuration expresses a target size as an integer, a pair of
//! integers, or a string (`"c75x75"`, `"f75x75"`, or a raw geometry such as
//! `"100x100>"`). [`RawSize`] is the serde-untagged shape of that config
//! value; [`parse_spec`] converts it into a tagged [`SizeSpec`] exactly once
//! per resize request, so nothing downstream re-inspects the raw value's type.
//!
//! ## Accepted forms
//!
//! | Raw value | Result |
//! |-----------|--------|
//! | `150` | `Square(150)` |
//! | `[150]` | unwrapped, re-evaluated → `Square(150)` |
//! | `[200, 100]` | `Explicit(200, 100)` |
//! | `"c75x75"` | `Crop(75, 75)` |
//! | `"f75x75"` | `ScaleFit(75, 75)` |
//! | `"100x100>"` | `GeometryFit("100x100>")` (passed to the codec verbatim) |
//!
//! Malformed `c`/`f` bodies and non-positive integers fail fast with
//! [`SpecError::InvalidSizeSpec`]; they are never silently defaulted.

use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("invalid size spec: {0}")]
    InvalidSizeSpec(String),
}

/// A size option as it appears in configuration, before validation.
///
/// Untagged so that `150`, `[200, 100]`, `["c75x75"]`, and `"f75x75"` all
/// deserialize from the same `size` key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawSize {
    Int(i64),
    Str(String),
    List(Vec<RawSize>),
}

/// A validated, immutable size specifier.
///
/// Parsed once per resize request; carries no identity beyond that call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeSpec {
    /// Square thumbnail of side `n`.
    Square(u32),
    /// Thumbnail with explicit dimensions.
    Explicit(u32, u32),
    /// Center-crop then resize to exact dimensions.
    Crop(u32, u32),
    /// Proportional scale centered on a background-filled canvas of exact size.
    ScaleFit(u32, u32),
    /// Generic bounding-box geometry, interpreted by the codec's grammar.
    GeometryFit(String),
}

/// Parse a raw configuration value into a [`SizeSpec`].
///
/// A one-element list unwraps to its single element and is re-evaluated. A
/// two-element list whose first element is an integer becomes
/// [`SizeSpec::Explicit`]; any other list shape is rejected.
pub fn parse_spec(raw: &RawSize) -> Result<SizeSpec, SpecError> {
    match raw {
        RawSize::Int(n) => Ok(SizeSpec::Square(positive(*n)?)),
        RawSize::Str(s) => s.parse(),
        RawSize::List(items) => match items.as_slice() {
            [single] => parse_spec(single),
            [RawSize::Int(w), RawSize::Int(h)] => {
                Ok(SizeSpec::Explicit(positive(*w)?, positive(*h)?))
            }
            _ => Err(SpecError::InvalidSizeSpec(format!(
                "expected [width, height], got a {}-element list",
                items.len()
            ))),
        },
    }
}

impl FromStr for SizeSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(body) = s.strip_prefix('c') {
            let (w, h) = parse_wxh(s, body)?;
            Ok(SizeSpec::Crop(w, h))
        } else if let Some(body) = s.strip_prefix('f') {
            let (w, h) = parse_wxh(s, body)?;
            Ok(SizeSpec::ScaleFit(w, h))
        } else {
            // Any other string is a geometry spec for the codec's grammar.
            Ok(SizeSpec::GeometryFit(s.to_string()))
        }
    }
}

fn positive(n: i64) -> Result<u32, SpecError> {
    if n <= 0 {
        return Err(SpecError::InvalidSizeSpec(format!(
            "dimension must be positive, got {n}"
        )));
    }
    u32::try_from(n).map_err(|_| SpecError::InvalidSizeSpec(format!("dimension {n} out of range")))
}

/// Parse the `WxH` body of a `c`/`f` prefixed spec as non-negative integers.
fn parse_wxh(full: &str, body: &str) -> Result<(u32, u32), SpecError> {
    let invalid = || SpecError::InvalidSizeSpec(format!("expected WxH in {full:?}"));
    let (w, h) = body.split_once('x').ok_or_else(invalid)?;
    Ok((
        w.parse().map_err(|_| invalid())?,
        h.parse().map_err(|_| invalid())?,
    ))
}
