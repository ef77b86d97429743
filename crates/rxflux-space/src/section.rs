//! Unbranched cylindrical sections.

use std::f64::consts::PI;
use std::fmt;

use crate::error::SpaceError;

/// Identifies a section within a [`Cable`](crate::Cable).
///
/// `SectionId(n)` is the n-th section added to the builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub u32);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An unbranched cylinder split into `nseg` equal segments.
///
/// Positions along the section are normalized: `x = 0` is the 0-end,
/// `x = 1` the 1-end.
///
/// # Examples
///
/// ```
/// use rxflux_space::Section;
///
/// let sec = Section::new("sec", 10.0, 11, 5.0).unwrap();
/// assert_eq!(sec.segment_index(0.3).unwrap(), 3);
/// assert_eq!(sec.segment_index(1.0).unwrap(), 10);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    name: String,
    length: f64,
    nseg: u32,
    diam: f64,
}

impl Section {
    /// Create a section of `length` split into `nseg` segments of
    /// diameter `diam`.
    ///
    /// Returns `Err(SpaceError::InvalidSection)` if `nseg == 0` or if
    /// `length` or `diam` is not finite and positive.
    pub fn new(
        name: impl Into<String>,
        length: f64,
        nseg: u32,
        diam: f64,
    ) -> Result<Self, SpaceError> {
        let name = name.into();
        if nseg == 0 {
            return Err(SpaceError::InvalidSection {
                reason: format!("section '{name}': nseg must be at least 1"),
            });
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(SpaceError::InvalidSection {
                reason: format!("section '{name}': length must be finite and positive, got {length}"),
            });
        }
        if !diam.is_finite() || diam <= 0.0 {
            return Err(SpaceError::InvalidSection {
                reason: format!("section '{name}': diam must be finite and positive, got {diam}"),
            });
        }
        Ok(Self {
            name,
            length,
            nseg,
            diam,
        })
    }

    /// Section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total length.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Number of segments.
    pub fn nseg(&self) -> u32 {
        self.nseg
    }

    /// Diameter.
    pub fn diam(&self) -> f64 {
        self.diam
    }

    /// Length of one segment.
    pub fn dx(&self) -> f64 {
        self.length / self.nseg as f64
    }

    /// Cross-sectional area.
    pub fn cross_section(&self) -> f64 {
        let r = self.diam / 2.0;
        PI * r * r
    }

    /// Volume of one segment.
    pub fn segment_volume(&self) -> f64 {
        self.cross_section() * self.dx()
    }

    /// Index of the segment containing normalized position `x`.
    ///
    /// Segment `i` covers `[i/nseg, (i+1)/nseg)`; `x = 1` maps to the last
    /// segment.
    pub fn segment_index(&self, x: f64) -> Result<usize, SpaceError> {
        if !(0.0..=1.0).contains(&x) {
            return Err(SpaceError::PositionOutOfRange { x });
        }
        let i = (x * self.nseg as f64).floor() as usize;
        Ok(i.min(self.nseg as usize - 1))
    }

    /// Normalized position of the centre of segment `i`.
    pub fn segment_centre(&self, i: usize) -> f64 {
        (i as f64 + 0.5) / self.nseg as f64
    }
}
