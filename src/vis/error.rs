// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with simulating visibilities.

use thiserror::Error;

use crate::beam::BeamError;

#[derive(Error, Debug)]
pub enum VisError {
    #[error("{arg} has shape {got:?}, but expected {expected}")]
    Shape {
        arg: &'static str,
        expected: String,
        got: Vec<usize>,
    },

    #[error("Precision selector must be 1 (single) or 2 (double), but got {0}")]
    InvalidPrecision(u8),

    #[error("The frequency must be positive and finite, but got {0} GHz")]
    InvalidFrequency(f64),

    #[error("Source intensities must be non-negative, but intensity {index} is {value}")]
    NegativeIntensity { index: usize, value: f64 },

    #[error("{arg} contains non-finite values")]
    NonFiniteInput { arg: &'static str },

    #[error("No beams were supplied; give either pixel beams or beam models")]
    NoBeamSource,

    #[error("Both pixel beams and beam models were supplied; only one may be given")]
    BothBeamSources,

    #[error("The list of beam models is empty")]
    EmptyBeamList,

    #[error("The pixel beams have {num_axes} polarisation axes and {num_feeds} feeds, but {expected} are needed when polarised is {polarised}")]
    PixelCubePolarisations {
        num_axes: usize,
        num_feeds: usize,
        expected: usize,
        polarised: bool,
    },

    #[error("The beam index has {got} entries, but there are {num_ants} antennas")]
    BeamIndexLength { got: usize, num_ants: usize },

    #[error("Antenna {antenna} uses beam {index}, but there are only {num_beams} beams")]
    BeamIndexOutOfRange {
        antenna: usize,
        index: usize,
        num_beams: usize,
    },

    #[error("There are {num_beams} beams and {num_ants} antennas; a beam index must be supplied to say which antenna uses which beam")]
    BeamIndexRequired { num_beams: usize, num_ants: usize },

    #[error("Beam {beam} can't be used for this simulation: {err}")]
    IncompatibleBeam {
        beam: usize,
        #[source]
        err: BeamError,
    },

    #[error("Beam {beam} gave a non-finite amplitude at time index {time_index}")]
    NonFiniteBeam { time_index: usize, beam: usize },

    #[error("The output buffer has shape {got:?}, but expected {expected:?}")]
    OutputShape {
        expected: [usize; 5],
        got: Vec<usize>,
    },

    #[error(transparent)]
    Beam(#[from] BeamError),
}
