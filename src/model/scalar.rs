//! Typed scalar values used throughout the OFD descriptors
//!
//! Every attribute value in an OFD file is a string; the types here give
//! them a parsed form and a lossless textual emitter.

use std::fmt;
use std::ops::Deref;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::error::{Error, Result};

/// Object identifier, unique within a `Document`.
pub type Id = u64;

/// Reference to an [`Id`].
pub type RefId = u64;

pub fn parse_id(s: &str) -> Result<Id> {
    s.trim()
        .parse::<u64>()
        .map_err(|e| Error::Parse(format!("invalid ID '{s}': {e}")))
}

fn parse_f64(s: &str, what: &str) -> Result<f64> {
    s.parse::<f64>()
        .map_err(|e| Error::Parse(format!("invalid {what} '{s}': {e}")))
}

/// A rectangle given as `X Y Width Height` in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl StBox {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        StBox { x, y, w, h }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != 4 {
            return Err(Error::Parse(format!(
                "box needs 4 values (X Y Width Height), got {}",
                parts.len()
            )));
        }
        let b = StBox {
            x: parse_f64(parts[0], "box x")?,
            y: parse_f64(parts[1], "box y")?,
            w: parse_f64(parts[2], "box width")?,
            h: parse_f64(parts[3], "box height")?,
        };
        if b.w < 0.0 {
            return Err(Error::Parse(format!("box width must not be negative: {}", b.w)));
        }
        if b.h < 0.0 {
            return Err(Error::Parse(format!("box height must not be negative: {}", b.h)));
        }
        Ok(b)
    }

    /// Shift the origin by another box's origin, keeping this box's size.
    pub fn copy_and_shift(&self, by: &StBox) -> StBox {
        StBox {
            x: self.x + by.x,
            y: self.y + by.y,
            w: self.w,
            h: self.h,
        }
    }

    pub fn is_portrait(&self) -> bool {
        self.h > self.w
    }
}

impl fmt::Display for StBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.w, self.h)
    }
}

/// A point, parsed from `"x,y"` or `"x y"`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pos {
    pub x: f64,
    pub y: f64,
}

impl Pos {
    pub fn new(x: f64, y: f64) -> Self {
        Pos { x, y }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(|c| c == ',' || c == ' ').filter(|p| !p.is_empty()).collect();
        if parts.len() != 2 {
            return Err(Error::Parse(format!("invalid position '{s}', expected 'x,y'")));
        }
        Ok(Pos {
            x: parse_f64(parts[0], "position x")?,
            y: parse_f64(parts[1], "position y")?,
        })
    }
}

/// 8-bit RGBA colour, parsed from `"R G B"` or `"R G B A"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

pub const BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 255 };
pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(BLACK);
        }
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(Error::Parse(format!(
                "invalid color '{s}', expected 'R G B' or 'R G B A'"
            )));
        }
        let mut values = [0u8, 0, 0, 255];
        for (i, part) in parts.iter().enumerate() {
            let v: i64 = part
                .parse()
                .map_err(|e| Error::Parse(format!("invalid number '{part}' in color: {e}")))?;
            if !(0..=255).contains(&v) {
                return Err(Error::Parse(format!("color value out of range 0-255: {v}")));
            }
            values[i] = v as u8;
        }
        Ok(Rgba::new(values[0], values[1], values[2], values[3]))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "{} {} {}", self.r, self.g, self.b)
        } else {
            write!(f, "{} {} {} {}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        BLACK
    }
}

/// Affine 2D transform `[[a c e] [b d f] [0 0 1]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

pub const IDENTITY: Matrix = Matrix { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

impl Matrix {
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(Error::Parse(format!("CTM needs 6 values, got {}", parts.len())));
        }
        let mut v = [0.0f64; 6];
        for (i, part) in parts.iter().enumerate() {
            v[i] = parse_f64(part, "CTM value")?;
        }
        Ok(Matrix { a: v[0], b: v[1], c: v[2], d: v[3], e: v[4], f: v[5] })
    }

    pub fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }

    pub fn transform_pos(&self, p: Pos) -> (f64, f64) {
        self.transform(p.x, p.y)
    }

    pub fn y_scale(&self) -> f64 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Rotation component in radians, `atan2(b, a)`.
    pub fn rotation(&self) -> f64 {
        self.b.atan2(self.a)
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation().to_degrees()
    }

    /// Standard 3×3 multiplication with the affine row implicit.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        IDENTITY
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.4} {:.4} {:.4} {:.4} {:.4} {:.4}]",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}

/// Whitespace-separated float list with the inline run-length form
/// `g <count> <value>`.
///
/// Parsing is lenient: tokens that fail to parse are skipped, matching how
/// real-world files use these attributes (delta arrays, dash patterns).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FloatArray(pub Vec<f64>);

impl FloatArray {
    pub fn parse(s: &str) -> FloatArray {
        let mut result = Vec::new();
        let mut tokens = s.split_whitespace();
        while let Some(token) = tokens.next() {
            if token == "g" {
                let count = tokens.next().and_then(|t| t.parse::<usize>().ok()).unwrap_or(0);
                let value = tokens.next().and_then(|t| t.parse::<f64>().ok()).unwrap_or(0.0);
                result.extend(std::iter::repeat(value).take(count));
            } else if let Ok(v) = token.parse::<f64>() {
                result.push(v);
            }
        }
        FloatArray(result)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for FloatArray {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl fmt::Display for FloatArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{v}")?;
            first = false;
        }
        Ok(())
    }
}

/// Whitespace-separated integer list; unparsable tokens are skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntArray(pub Vec<i64>);

impl IntArray {
    pub fn parse(s: &str) -> IntArray {
        IntArray(s.split_whitespace().filter_map(|t| t.parse::<i64>().ok()).collect())
    }
}

impl Deref for IntArray {
    type Target = [i64];

    fn deref(&self) -> &[i64] {
        &self.0
    }
}

/// Date or date-time value as it appears in `DocInfo` and annotations.
///
/// Emits the shortest form that losslessly represents the value: date-only
/// when the time of day is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime(pub NaiveDateTime);

impl DateTime {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(DateTime(date.and_time(chrono::NaiveTime::MIN)));
        }
        // Compact YYYYMMDD; chrono's flexible-width year would swallow all
        // eight digits, so split it by hand.
        if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
            let dashed = format!("{}-{}-{}", &s[..4], &s[4..6], &s[6..8]);
            if let Ok(date) = NaiveDate::parse_from_str(&dashed, "%Y-%m-%d") {
                return Ok(DateTime(date.and_time(chrono::NaiveTime::MIN)));
            }
        }
        for fmt in [
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S",
            "%m/%d/%Y %I:%M:%S %p",
        ] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(DateTime(dt));
            }
        }
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
            return Ok(DateTime(dt.naive_local()));
        }

        Err(Error::Parse(format!("unable to parse date-time '{s}'")))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.0.time();
        if t.hour() == 0 && t.minute() == 0 && t.second() == 0 {
            write!(f, "{}", self.0.format("%Y-%m-%d"))
        } else {
            write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_box_parse_and_shift() {
        let b = StBox::parse("10 20 30 40").unwrap();
        assert_eq!(b, StBox::new(10.0, 20.0, 30.0, 40.0));

        let shifted = b.copy_and_shift(&StBox::new(5.0, 7.0, 999.0, 999.0));
        assert_eq!(shifted, StBox::new(15.0, 27.0, 30.0, 40.0));
    }

    #[test]
    fn test_box_rejects_negative_size() {
        assert!(StBox::parse("0 0 -1 5").is_err());
        assert!(StBox::parse("0 0 5 -1").is_err());
        assert!(StBox::parse("0 0 5").is_err());
    }

    #[test]
    fn test_pos_parse() {
        assert_eq!(Pos::parse("1.5,2.5").unwrap(), Pos::new(1.5, 2.5));
        assert_eq!(Pos::parse("1.5 2.5").unwrap(), Pos::new(1.5, 2.5));
        assert!(Pos::parse("1.5").is_err());
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(Rgba::parse("156 82 35").unwrap(), Rgba::new(156, 82, 35, 255));
        assert_eq!(Rgba::parse("156 82 35 128").unwrap(), Rgba::new(156, 82, 35, 128));
        assert_eq!(Rgba::parse("").unwrap(), BLACK);
        assert!(Rgba::parse("0 0 0 300").is_err());
        assert!(Rgba::parse("0 0").is_err());
        assert!(Rgba::parse("0 0 x").is_err());
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Rgba::new(1, 2, 3, 255).to_string(), "1 2 3");
        assert_eq!(Rgba::new(1, 2, 3, 4).to_string(), "1 2 3 4");
    }

    #[test]
    fn test_matrix_transform() {
        let m = Matrix::parse("1 0 0 1 10 20").unwrap();
        assert_eq!(m.transform(3.0, 4.0), (13.0, 24.0));

        let m = Matrix { a: 2.0, b: 0.5, c: 1.0, d: 3.0, e: 5.0, f: 6.0 };
        let (x, y) = m.transform(7.0, 11.0);
        assert_eq!(x, 2.0 * 7.0 + 1.0 * 11.0 + 5.0);
        assert_eq!(y, 0.5 * 7.0 + 3.0 * 11.0 + 6.0);
    }

    #[test]
    fn test_matrix_identity() {
        assert_eq!(IDENTITY.transform(4.2, -1.3), (4.2, -1.3));
        let m = Matrix { a: 2.0, b: 0.5, c: 1.0, d: 3.0, e: 5.0, f: 6.0 };
        assert_eq!(IDENTITY.multiply(&m), m);
        assert_eq!(m.multiply(&IDENTITY), m);
    }

    #[test]
    fn test_matrix_rotation_and_scale() {
        // Pure 90° rotation.
        let m = Matrix { a: 0.0, b: 1.0, c: -1.0, d: 0.0, e: 0.0, f: 0.0 };
        assert!((m.rotation_degrees() - 90.0).abs() < 1e-9);
        assert!((m.y_scale() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_matrix_parse_wrong_arity() {
        assert!(Matrix::parse("1 0 0 1 0").is_err());
        assert!(Matrix::parse("1 0 0 1 0 0 0").is_err());
    }

    #[test]
    fn test_float_array_run_length() {
        assert_eq!(FloatArray::parse("g 3 5").0, vec![5.0, 5.0, 5.0]);
        assert_eq!(FloatArray::parse("1 2 g 3 5 4").0, vec![1.0, 2.0, 5.0, 5.0, 5.0, 4.0]);
        assert_eq!(FloatArray::parse("").0, Vec::<f64>::new());
        assert_eq!(FloatArray::parse("1.5 -2").0, vec![1.5, -2.0]);
    }

    #[test]
    fn test_int_array() {
        assert_eq!(IntArray::parse("3 1 4 1 5").0, vec![3, 1, 4, 1, 5]);
        assert_eq!(IntArray::parse("").0, Vec::<i64>::new());
    }

    #[test]
    fn test_datetime_formats() {
        for s in [
            "2024-11-20",
            "2024-11-2",
            "20241120",
            "2024-11-20T08:30:00",
            "2024-11-20 08:30:00",
            "2024-11-20T08:30:00+08:00",
            "11/20/2024 8:30:00 AM",
        ] {
            let dt = DateTime::parse(s).unwrap_or_else(|e| panic!("{s}: {e}"));
            assert_eq!(dt.0.date().year(), 2024);
            assert_eq!(dt.0.date().month(), 11);
        }
        assert!(DateTime::parse("not a date").is_err());
    }

    #[test]
    fn test_datetime_display_shortest() {
        let d = DateTime::parse("2024-11-20").unwrap();
        assert_eq!(d.to_string(), "2024-11-20");
        let dt = DateTime::parse("2024-11-20 08:30:01").unwrap();
        assert_eq!(dt.to_string(), "2024-11-20T08:30:01");
    }
}
