// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with beam responses.

use thiserror::Error;

use crate::PowerPol;

#[derive(Error, Debug)]
pub enum BeamError {
    #[error("Got {num_az} azimuths but {num_za} zenith angles; these must be the same length")]
    AzZaLengthMismatch { num_az: usize, num_za: usize },

    #[error("No frequencies were given to evaluate the beam at")]
    NoFreqs,

    #[error("Beam response has shape {got:?}, but expected {expected:?}")]
    ResponseShape {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Polarised visibilities need a full electric-field beam with 2 axes and 2 feeds, but got {got}")]
    PolarisedNeedsEField { got: String },

    #[error("Unpolarised visibilities need a single-polarisation power beam, but got {got}")]
    ScalarNeedsPower { got: String },

    #[error("The power beam doesn't have the {pol} polarisation (it has {available})")]
    MissingPowerPol { pol: PowerPol, available: String },

    #[error("The {0} power beam is a cross-polarisation; an amplitude can only be taken from XX or YY")]
    CrossPowerPol(PowerPol),

    #[error("Pixel beams must be square with at least 2 pixels per side, but got {rows}x{cols}")]
    PixelGridShape { rows: usize, cols: usize },

    #[error(transparent)]
    Analytic(#[from] crate::analytic::AnalyticBeamError),
}
