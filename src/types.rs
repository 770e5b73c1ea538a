// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Generic types.

use std::fmt::{Debug, Display};

use num_traits::{Float, FloatConst};

use crate::vis::VisError;

/// Which floating-point width is used for all kernel arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// `f32` reals and `Complex<f32>` complex numbers.
    Single,

    /// `f64` reals and `Complex<f64>` complex numbers.
    Double,
}

impl TryFrom<u8> for Precision {
    type Error = VisError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            1 => Ok(Precision::Single),
            2 => Ok(Precision::Double),
            _ => Err(VisError::InvalidPrecision(selector)),
        }
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Precision::Single => "single",
                Precision::Double => "double",
            }
        )
    }
}

/// A float type the visibility kernel can run in. Only implemented for `f32`
/// and `f64`.
pub trait VisFloat:
    Float + FloatConst + Default + Debug + Display + Send + Sync + 'static
{
    /// The [`Precision`] corresponding to this type.
    const PRECISION: Precision;

    /// Cast from `f64`, rounding if necessary.
    fn from_f64(v: f64) -> Self;

    /// Cast to `f64`.
    fn as_f64(self) -> f64;
}

impl VisFloat for f32 {
    const PRECISION: Precision = Precision::Single;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl VisFloat for f64 {
    const PRECISION: Precision = Precision::Double;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}

/// Instrumental polarisations available from a power beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerPol {
    #[default]
    XX,
    YY,
    XY,
    YX,
}

impl PowerPol {
    /// Is this an auto-polarisation (i.e. XX or YY)? Only these have a
    /// well-defined amplitude (the square root of the power).
    pub fn is_auto(self) -> bool {
        matches!(self, PowerPol::XX | PowerPol::YY)
    }
}

impl Display for PowerPol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PowerPol::XX => "XX",
                PowerPol::YY => "YY",
                PowerPol::XY => "XY",
                PowerPol::YX => "YX",
            }
        )
    }
}
