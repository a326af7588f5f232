//! Paper geometry – orientation, named paper formats, DPI-derived viewports
//! and CSS lengths for header/footer bands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorkerError;

/// Width of the base page in centimetres (A4 portrait).
pub const BASE_WIDTH_CM: f64 = 21.0;
/// Height of the base page in centimetres (A4 portrait).
pub const BASE_HEIGHT_CM: f64 = 29.7;

const CM_PER_INCH: f64 = 2.54;

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Height > width (default).
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }

    /// Order a `(short, long)` pair of edges for this orientation.
    pub fn orient<T>(self, short: T, long: T) -> (T, T) {
        match self {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown orientation `{0}` (expected `portrait` or `landscape`)")]
pub struct ParseOrientationError(String);

impl FromStr for Orientation {
    type Err = ParseOrientationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            _ => Err(ParseOrientationError(s.to_string())),
        }
    }
}

/// Named paper formats the worker knows how to size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperFormat {
    A3,
    A4,
    A5,
    Legal,
    Letter,
    Tabloid,
}

impl PaperFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        let format = match name.trim().to_ascii_lowercase().as_str() {
            "a3" => PaperFormat::A3,
            "a4" => PaperFormat::A4,
            "a5" => PaperFormat::A5,
            "legal" => PaperFormat::Legal,
            "letter" => PaperFormat::Letter,
            "tabloid" => PaperFormat::Tabloid,
            _ => return None,
        };
        Some(format)
    }

    /// Portrait `(width, height)` in inches.
    pub fn size_in(self) -> (f64, f64) {
        match self {
            PaperFormat::A3 => (11.69, 16.54),
            PaperFormat::A4 => (8.27, 11.69),
            PaperFormat::A5 => (5.83, 8.27),
            PaperFormat::Legal => (8.5, 14.0),
            PaperFormat::Letter => (8.5, 11.0),
            PaperFormat::Tabloid => (11.0, 17.0),
        }
    }
}

/// Page size used for one render.
#[derive(Debug, Clone, PartialEq)]
pub enum PaperGeometry {
    /// A named paper format; the engine applies the orientation.
    Named {
        format: String,
        orientation: Orientation,
    },
    /// A pixel viewport derived from DPI and orientation.
    Viewport {
        width_px: u32,
        height_px: u32,
        dpi: u32,
    },
}

impl PaperGeometry {
    /// A non-empty `format` wins; otherwise size the base page at `dpi`.
    pub fn resolve(format: Option<&str>, orientation: Orientation, dpi: u32) -> Self {
        match format.map(str::trim).filter(|f| !f.is_empty()) {
            Some(format) => PaperGeometry::Named {
                format: format.to_string(),
                orientation,
            },
            None => {
                let dots_per_cm = f64::from(dpi) / CM_PER_INCH;
                let (width_cm, height_cm) = orientation.orient(BASE_WIDTH_CM, BASE_HEIGHT_CM);
                PaperGeometry::Viewport {
                    width_px: (width_cm * dots_per_cm).round() as u32,
                    height_px: (height_cm * dots_per_cm).round() as u32,
                    dpi,
                }
            }
        }
    }

    /// Browser window size, if this geometry prescribes one.
    pub fn viewport(&self) -> Option<(u32, u32)> {
        match *self {
            PaperGeometry::Viewport {
                width_px,
                height_px,
                ..
            } => Some((width_px, height_px)),
            PaperGeometry::Named { .. } => None,
        }
    }

    /// Printed paper size in inches, as `(width, height, landscape_flag)`.
    ///
    /// Named formats report their portrait size and let the engine rotate;
    /// viewports are already oriented.
    pub fn paper_size_in(&self) -> Result<(f64, f64, bool), WorkerError> {
        match self {
            PaperGeometry::Named {
                format,
                orientation,
            } => {
                let paper = PaperFormat::from_name(format)
                    .ok_or_else(|| WorkerError::UnknownPaperFormat(format.clone()))?;
                let (w, h) = paper.size_in();
                Ok((w, h, *orientation == Orientation::Landscape))
            }
            PaperGeometry::Viewport {
                width_px,
                height_px,
                dpi,
            } => {
                if *dpi == 0 {
                    return Err(WorkerError::InvalidDpi);
                }
                let dpi = f64::from(*dpi);
                Ok((
                    f64::from(*width_px) / dpi,
                    f64::from(*height_px) / dpi,
                    false,
                ))
            }
        }
    }
}

/// A CSS length such as `1cm`, `12px` or `0.5in`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssLength {
    inches: f64,
}

impl CssLength {
    pub fn from_inches(inches: f64) -> Self {
        Self { inches }
    }

    pub fn inches(self) -> f64 {
        self.inches
    }
}

impl std::ops::Add for CssLength {
    type Output = CssLength;

    fn add(self, rhs: CssLength) -> CssLength {
        CssLength::from_inches(self.inches + rhs.inches)
    }
}

impl FromStr for CssLength {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| WorkerError::InvalidLength(s.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(WorkerError::InvalidLength(s.to_string()));
        }

        let per_inch = match unit.to_ascii_lowercase().as_str() {
            "" | "px" => 96.0,
            "pt" => 72.0,
            "mm" => 25.4,
            "cm" => CM_PER_INCH,
            "in" => 1.0,
            _ => return Err(WorkerError::InvalidLength(s.to_string())),
        };
        Ok(CssLength::from_inches(value / per_inch))
    }
}
