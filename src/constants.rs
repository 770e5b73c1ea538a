// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.
 */

pub use marlu::constants::VEL_C;

/// Hz per GHz.
pub(crate) const HZ_PER_GHZ: f64 = 1e9;

/// The fraction of a source's intensity assigned to each polarisation feed.
/// This is applied in every polarisation mode.
pub(crate) const FEED_INTENSITY_FRACTION: f64 = 0.5;

/// The largest element-wise deviation of `RᵀR` from the identity before a
/// rotation matrix is reported as not orthonormal.
pub(crate) const ORTHONORMAL_TOLERANCE: f64 = 1e-4;

/// Found by fitting a Gaussian to an Airy disk; used to turn an effective dish
/// diameter into a Gaussian beam width.
pub(crate) const AIRY_GAUSSIAN_SCALAR: f64 = 2.2150894;

/// FWHM of a Gaussian in units of its standard deviation (2 * sqrt(2 ln 2)),
/// rounded as it usually is in beam codes.
pub(crate) const FWHM_PER_SIGMA: f64 = 2.355;
