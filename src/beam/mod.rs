// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to abstract beam calculations.
//!
//! Antenna beams come in two flavours. A [`PixelBeamCube`] holds beam
//! amplitudes sampled on a regular grid of direction cosines and is queried by
//! interpolation. A [`BeamModel`] is anything that can directly evaluate its
//! response at (azimuth, zenith angle) directions; [`AnalyticBeam`] is one such
//! model.
//!
//! [`AnalyticBeam`]: crate::analytic::AnalyticBeam

mod error;
pub(crate) mod evaluator;
mod pixel;
#[cfg(test)]
mod tests;

pub use error::BeamError;
pub(crate) use evaluator::BeamEvaluator;
pub use pixel::{InterpolationOrder, PixelBeamCube};

use std::any::Any;

use marlu::c64;
use ndarray::prelude::*;

use crate::PowerPol;

/// What kind of response a [`BeamModel`] gives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeamKind {
    /// A complex electric-field response for each (polarisation axis,
    /// polarisation feed) pair, i.e. a Jones matrix.
    EField { num_axes: usize, num_feeds: usize },

    /// A power response for each of the listed instrumental polarisations.
    /// The power is the squared amplitude of the field response.
    Power { pols: Vec<PowerPol> },
}

impl std::fmt::Display for BeamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BeamKind::EField {
                num_axes,
                num_feeds,
            } => write!(f, "an E-field beam with {num_axes} axes and {num_feeds} feeds"),
            BeamKind::Power { pols } => {
                write!(f, "a power beam with polarisations {}", format_pols(pols))
            }
        }
    }
}

fn format_pols(pols: &[PowerPol]) -> String {
    let pols: Vec<String> = pols.iter().map(|p| p.to_string()).collect();
    format!("[{}]", pols.join(", "))
}

/// Options passed through to [`BeamModel::interp`] untouched. Models define
/// their own options type and recover it with `downcast_ref`; an options value
/// of an unexpected type should be treated as absent or as an error, as the
/// model sees fit.
pub type ModelOptions<'a> = Option<&'a (dyn Any + Send + Sync)>;

/// A trait abstracting beam codes that can be evaluated directly at arbitrary
/// directions.
pub trait BeamModel: Sync + Send {
    /// Get the kind of response this beam gives.
    fn beam_kind(&self) -> BeamKind;

    /// Evaluate the beam at each (`az_rad`, `za_rad`) direction and each
    /// frequency \[Hz\]. Azimuths follow the convention of
    /// [`lm_to_az_za`](crate::direction::lm_to_az_za). `model_opts` is
    /// whatever the caller put in [`BeamInterpOptions::model_opts`].
    ///
    /// The result must have shape `(num_axes, num_feeds, num_freqs,
    /// num_directions)` for an [`BeamKind::EField`] beam and `(1, num_pols,
    /// num_freqs, num_directions)` for a [`BeamKind::Power`] beam, with the
    /// polarisations in the order declared by [`BeamModel::beam_kind`].
    ///
    /// This will be called many times with the same frequency.
    fn interp(
        &self,
        az_rad: &[f64],
        za_rad: &[f64],
        freqs_hz: &[f64],
        model_opts: ModelOptions,
    ) -> Result<Array4<c64>, BeamError>;
}

/// Options controlling how beam amplitudes are obtained.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeamInterpOptions<'a> {
    /// How [`PixelBeamCube`]s are interpolated.
    pub grid_order: InterpolationOrder,

    /// Which power-beam polarisation is used in unpolarised simulations.
    pub power_pol: PowerPol,

    /// Forwarded to every [`BeamModel::interp`] call, whether the model is
    /// evaluated during a simulation or rasterised with
    /// [`PixelBeamCube::from_models`].
    pub model_opts: ModelOptions<'a>,
}

/// How to turn a [`BeamModel`] response into amplitudes indexed by (axis,
/// feed, direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponseSelection {
    /// Take the whole 2x2 Jones block.
    Jones,

    /// Take one power polarisation and square root it.
    PowerAmplitude { pol_index: usize },
}

impl ResponseSelection {
    /// Work out how a beam of `kind` is used, failing if it cannot provide
    /// what's needed for the polarisation mode.
    pub(crate) fn new(
        kind: &BeamKind,
        polarised: bool,
        power_pol: PowerPol,
    ) -> Result<ResponseSelection, BeamError> {
        match (kind, polarised) {
            (
                BeamKind::EField {
                    num_axes: 2,
                    num_feeds: 2,
                },
                true,
            ) => Ok(ResponseSelection::Jones),
            (_, true) => Err(BeamError::PolarisedNeedsEField {
                got: kind.to_string(),
            }),

            (BeamKind::Power { pols }, false) => {
                if !power_pol.is_auto() {
                    return Err(BeamError::CrossPowerPol(power_pol));
                }
                match pols.iter().position(|&p| p == power_pol) {
                    Some(pol_index) => Ok(ResponseSelection::PowerAmplitude { pol_index }),
                    None => Err(BeamError::MissingPowerPol {
                        pol: power_pol,
                        available: format_pols(pols),
                    }),
                }
            }
            (_, false) => Err(BeamError::ScalarNeedsPower {
                got: kind.to_string(),
            }),
        }
    }

    /// The number of (polarisation axes, polarisation feeds) this selection
    /// yields.
    pub(crate) fn num_axes_feeds(self) -> (usize, usize) {
        match self {
            ResponseSelection::Jones => (2, 2),
            ResponseSelection::PowerAmplitude { .. } => (1, 1),
        }
    }

    /// Reduce a single-frequency response of shape `(a, b, 1, num_dirs)` to
    /// amplitudes of shape `(num_axes, num_feeds, num_dirs)`.
    pub(crate) fn select(
        self,
        response: ArrayView4<c64>,
        num_dirs: usize,
    ) -> Result<Array3<c64>, BeamError> {
        match self {
            ResponseSelection::Jones => {
                let expected = [2, 2, 1, num_dirs];
                if response.shape() != &expected[..] {
                    return Err(BeamError::ResponseShape {
                        expected: expected.to_vec(),
                        got: response.shape().to_vec(),
                    });
                }
                Ok(response.index_axis(Axis(2), 0).to_owned())
            }

            ResponseSelection::PowerAmplitude { pol_index } => {
                let (num_axes, num_pols, num_freqs, num_resp_dirs) = response.dim();
                if num_axes != 1
                    || pol_index >= num_pols
                    || num_freqs != 1
                    || num_resp_dirs != num_dirs
                {
                    return Err(BeamError::ResponseShape {
                        expected: vec![1, pol_index + 1, 1, num_dirs],
                        got: response.shape().to_vec(),
                    });
                }
                // A negative power gives a NaN here, which is caught with all
                // other non-finite amplitudes.
                let amps = response
                    .slice(s![0, pol_index, 0, ..])
                    .mapv(|p| c64::new(p.re.sqrt(), 0.0));
                Ok(amps.insert_axis(Axis(0)).insert_axis(Axis(0)))
            }
        }
    }
}
