// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Checks on the inputs to a simulation, done before any work.

use log::warn;
use ndarray::prelude::*;

use super::{VisError, VisOptions};
use crate::{
    beam::{evaluator::BeamSource, BeamModel, PixelBeamCube},
    constants::ORTHONORMAL_TOLERANCE,
};

/// Everything established about the inputs of a simulation.
pub(crate) struct ValidatedInputs<'a> {
    pub(crate) num_axes: usize,
    pub(crate) num_feeds: usize,
    pub(crate) num_ants: usize,
    pub(crate) num_times: usize,
    pub(crate) num_srcs: usize,
    pub(crate) num_beams: usize,
    /// The logical beam used by each antenna.
    pub(crate) beam_index: Vec<usize>,
    pub(crate) beams: BeamSource<'a>,
}

impl ValidatedInputs<'_> {
    /// The shape of the full output tensor, (time, feed, feed, antenna,
    /// antenna).
    pub(crate) fn output_dim(&self) -> [usize; 5] {
        [
            self.num_times,
            self.num_feeds,
            self.num_feeds,
            self.num_ants,
            self.num_ants,
        ]
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn validate<'a>(
    antpos: ArrayView2<f64>,
    freq_ghz: f64,
    eq2tops: ArrayView3<f64>,
    crd_eq: ArrayView2<f64>,
    intensities: ArrayView1<f64>,
    pixel_beams: Option<&'a PixelBeamCube>,
    beam_models: Option<&'a [&'a dyn BeamModel]>,
    options: &VisOptions,
) -> Result<ValidatedInputs<'a>, VisError> {
    if !(freq_ghz.is_finite() && freq_ghz > 0.0) {
        return Err(VisError::InvalidFrequency(freq_ghz));
    }

    let (num_ants, antpos_cols) = antpos.dim();
    if antpos_cols != 3 {
        return Err(VisError::Shape {
            arg: "antpos",
            expected: "(num_ants, 3)".to_string(),
            got: antpos.shape().to_vec(),
        });
    }
    let (num_times, eq2top_rows, eq2top_cols) = eq2tops.dim();
    if eq2top_rows != 3 || eq2top_cols != 3 {
        return Err(VisError::Shape {
            arg: "eq2tops",
            expected: "(num_times, 3, 3)".to_string(),
            got: eq2tops.shape().to_vec(),
        });
    }
    let (crd_eq_rows, num_srcs) = crd_eq.dim();
    if crd_eq_rows != 3 {
        return Err(VisError::Shape {
            arg: "crd_eq",
            expected: "(3, num_sources)".to_string(),
            got: crd_eq.shape().to_vec(),
        });
    }
    if intensities.len() != num_srcs {
        return Err(VisError::Shape {
            arg: "intensities",
            expected: format!("({num_srcs},)"),
            got: intensities.shape().to_vec(),
        });
    }

    check_finite("antpos", antpos.iter())?;
    check_finite("eq2tops", eq2tops.iter())?;
    check_finite("crd_eq", crd_eq.iter())?;
    check_finite("intensities", intensities.iter())?;
    if let Some((index, &value)) = intensities.iter().enumerate().find(|(_, &i)| i < 0.0) {
        return Err(VisError::NegativeIntensity { index, value });
    }
    warn_if_not_orthonormal(eq2tops);

    let (num_axes, num_feeds) = if options.polarised { (2, 2) } else { (1, 1) };
    let beams = match (pixel_beams, beam_models) {
        (Some(_), Some(_)) => return Err(VisError::BothBeamSources),
        (None, None) => return Err(VisError::NoBeamSource),
        (None, Some([])) => return Err(VisError::EmptyBeamList),
        (None, Some(models)) => BeamSource::Models(models),
        (Some(cube), None) => {
            if cube.num_axes() != num_axes || cube.num_feeds() != num_feeds {
                return Err(VisError::PixelCubePolarisations {
                    num_axes: cube.num_axes(),
                    num_feeds: cube.num_feeds(),
                    expected: num_axes,
                    polarised: options.polarised,
                });
            }
            BeamSource::Pixel(cube)
        }
    };
    let num_beams = beams.num_beams();
    if num_beams == 0 {
        return Err(VisError::EmptyBeamList);
    }
    let beam_index = get_beam_index(options.beam_index.as_deref(), num_ants, num_beams)?;

    Ok(ValidatedInputs {
        num_axes,
        num_feeds,
        num_ants,
        num_times,
        num_srcs,
        num_beams,
        beam_index,
        beams,
    })
}

/// Work out which logical beam each antenna uses. Without an explicit map, a
/// single beam is shared by all antennas and one beam per antenna is used in
/// order.
pub(crate) fn get_beam_index(
    beam_index: Option<&[usize]>,
    num_ants: usize,
    num_beams: usize,
) -> Result<Vec<usize>, VisError> {
    match beam_index {
        Some(beam_index) => {
            if beam_index.len() != num_ants {
                return Err(VisError::BeamIndexLength {
                    got: beam_index.len(),
                    num_ants,
                });
            }
            if let Some((antenna, &index)) = beam_index
                .iter()
                .enumerate()
                .find(|(_, &i_beam)| i_beam >= num_beams)
            {
                return Err(VisError::BeamIndexOutOfRange {
                    antenna,
                    index,
                    num_beams,
                });
            }
            Ok(beam_index.to_vec())
        }

        None if num_beams == 1 => Ok(vec![0; num_ants]),
        None if num_beams == num_ants => Ok((0..num_ants).collect()),
        None => Err(VisError::BeamIndexRequired {
            num_beams,
            num_ants,
        }),
    }
}

fn check_finite<'a>(
    arg: &'static str,
    mut values: impl Iterator<Item = &'a f64>,
) -> Result<(), VisError> {
    if values.all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(VisError::NonFiniteInput { arg })
    }
}

fn warn_if_not_orthonormal(eq2tops: ArrayView3<f64>) {
    let identity = Array2::<f64>::eye(3);
    for (i_time, eq2top) in eq2tops.outer_iter().enumerate() {
        let deviation = (&eq2top.t().dot(&eq2top) - &identity)
            .iter()
            .fold(0.0_f64, |acc, d| acc.max(d.abs()));
        if deviation > ORTHONORMAL_TOLERANCE {
            warn!("Rotation matrix {i_time} is not orthonormal (max deviation of RᵀR from I: {deviation:e})");
        }
    }
}
