// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Horizon-frame directions.

use marlu::AzEl;

use crate::VisFloat;

/// Anything that knows its zenith angle \[radians\]. The beams in this crate
/// are azimuthally symmetric, so this is all they need of a direction.
pub trait ZenithAngle: Copy {
    fn za_rad(&self) -> f64;
}

impl ZenithAngle for AzEl {
    fn za_rad(&self) -> f64 {
        self.za()
    }
}

/// A pair of floats is (azimuth, zenith angle), like the results of
/// [`lm_to_az_za`].
impl ZenithAngle for (f64, f64) {
    fn za_rad(&self) -> f64 {
        self.1
    }
}

/// Zipped (azimuth, zenith angle) slices.
impl ZenithAngle for (&f64, &f64) {
    fn za_rad(&self) -> f64 {
        *self.1
    }
}

/// Convert topocentric direction cosines (`l` towards east, `m` towards north)
/// into (azimuth, zenith angle) \[radians\].
///
/// Directions with `l² + m² >= 1` are put on the horizon. The azimuth is
/// `-atan2(m, l)`, which is the convention the beam models in this crate are
/// expected to follow.
pub fn lm_to_az_za<F: VisFloat>(l: F, m: F) -> (F, F) {
    let lsqr = l * l + m * m;
    let n = if lsqr < F::one() {
        (F::one() - lsqr).sqrt()
    } else {
        F::zero()
    };
    let az = -m.atan2(l);
    let za = F::FRAC_PI_2() - n.asin();
    (az, za)
}
