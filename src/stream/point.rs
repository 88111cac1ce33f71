//! The unit handed to output sinks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::util::{Error, Vector};

/// Opaque RGBA value passed through to the sink unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub [u8; 4]);

impl Color {
    /// Beam off.
    pub const BLACK: Self = Self([0, 0, 0, 0]);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgba(0x88, 0x00, 0x00, 0xff)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({self})")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

/// Parses `rrggbb` or `rrggbbaa`, with an optional leading `#`.
impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let bad = || Error::parameter("color", format!("{s:?} is not rrggbb[aa] hex"));
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(bad());
        }
        let mut c = [0xff; 4];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let digits = std::str::from_utf8(chunk).map_err(|_| bad())?;
            c[i] = u8::from_str_radix(digits, 16).map_err(|_| bad())?;
        }
        Ok(Self(c))
    }
}

/// One 2D sample of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub color: Color,
    /// Beam on (drawn) or off (blank move)
    pub on: bool,
}

impl Point {
    /// Drawn point at the screen position of `v` (depth is dropped).
    #[inline]
    pub fn drawn(v: Vector, color: Color) -> Self {
        Self {
            x: v.x,
            y: v.y,
            color,
            on: true,
        }
    }

    /// Blank point at the screen position of `v`.
    #[inline]
    pub fn blank(v: Vector) -> Self {
        Self {
            x: v.x,
            y: v.y,
            color: Color::BLACK,
            on: false,
        }
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        !self.on
    }

    #[inline]
    pub fn same_position(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}
