//! Physical units used by the document model.
//!
//! Lengths are stored as EMU (English Metric Units, 914400 per inch), the unit WordprocessingML
//! uses for drawings. Table and page geometry is expressed in twips (1440 per inch), which
//! divides EMU exactly.

pub const EMU_PER_INCH: i64 = 914_400;
pub const EMU_PER_TWIP: i64 = 635;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Length(i64);

impl Length {
    pub const ZERO: Self = Self(0);

    pub fn inches(v: f64) -> Self {
        Self((v * EMU_PER_INCH as f64).round() as i64)
    }

    pub fn from_emu(emu: i64) -> Self {
        Self(emu)
    }

    pub fn emu(self) -> i64 {
        self.0
    }

    pub fn twips(self) -> i64 {
        self.0 / EMU_PER_TWIP
    }

    /// Scale by `num / den`, rounding to the nearest EMU. `den == 0` yields zero.
    pub fn scale(self, num: u32, den: u32) -> Self {
        if den == 0 {
            return Self::ZERO;
        }
        let scaled = (self.0 as i128 * num as i128 + den as i128 / 2) / den as i128;
        Self(scaled as i64)
    }
}

impl std::ops::Add for Length {
    type Output = Length;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Length {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, l| acc + l)
    }
}

/// Font size in whole points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pt(pub u32);

impl Pt {
    /// WordprocessingML sizes runs in half-points.
    pub fn half_points(self) -> usize {
        self.0 as usize * 2
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Upper-case `RRGGBB`, no leading `#`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/units.rs"]
mod tests;
