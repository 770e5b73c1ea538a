// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with the analytic beams.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticBeamError {
    #[error("Got a zenith angle ({za} radians), but this is below the horizon")]
    BelowHorizon { za: f64 },

    #[error("A Gaussian beam width must be positive and finite, but got {0} radians")]
    BadSigma(f64),

    #[error("A dish diameter must be positive and finite, but got {0} metres")]
    BadDiameter(f64),

    #[error("A {diameter_m} m dish is too small to have a Gaussian beam at {freq_hz} Hz")]
    DishTooSmall { diameter_m: f64, freq_hz: f64 },

    #[error("Beam frequencies must be positive and finite, but got {0} Hz")]
    BadFreq(f64),
}
