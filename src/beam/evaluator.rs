// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Evaluate all logical beams towards the sources visible at one time sample.

use ndarray::prelude::*;
use num_complex::Complex;

use super::{
    pixel::BeamInterpolants, BeamError, BeamInterpOptions, BeamModel, ModelOptions,
    PixelBeamCube, ResponseSelection,
};
use crate::{direction::lm_to_az_za, vis::VisError, VisFloat};

/// The beam inputs to a simulation, after it has been established that
/// exactly one kind was given.
#[derive(Clone, Copy)]
pub(crate) enum BeamSource<'a> {
    Pixel(&'a PixelBeamCube),
    Models(&'a [&'a dyn BeamModel]),
}

impl BeamSource<'_> {
    pub(crate) fn num_beams(&self) -> usize {
        match self {
            BeamSource::Pixel(cube) => cube.num_beams(),
            BeamSource::Models(models) => models.len(),
        }
    }
}

/// Gives beam amplitudes indexed by (polarisation axis, polarisation feed,
/// logical beam, direction).
pub(crate) enum BeamEvaluator<'a, F: VisFloat> {
    Pixel {
        interpolants: BeamInterpolants<F>,
        num_axes: usize,
        num_feeds: usize,
        num_beams: usize,
    },

    Direct {
        models: &'a [&'a dyn BeamModel],
        selections: Vec<ResponseSelection>,
        model_opts: ModelOptions<'a>,
        freq_hz: f64,
        num_axes: usize,
        num_feeds: usize,
    },
}

impl<'a, F: VisFloat> BeamEvaluator<'a, F> {
    /// Prepare to evaluate beams. Pixel interpolants are built here, and
    /// direct models are checked for compatibility with the polarisation
    /// mode, so that nothing is wasted if the beams are unusable.
    pub(crate) fn new(
        beams: BeamSource<'a>,
        polarised: bool,
        options: &BeamInterpOptions<'a>,
        freq_hz: f64,
    ) -> Result<BeamEvaluator<'a, F>, VisError> {
        match beams {
            BeamSource::Pixel(cube) => Ok(BeamEvaluator::Pixel {
                interpolants: BeamInterpolants::new(cube, options.grid_order),
                num_axes: cube.num_axes(),
                num_feeds: cube.num_feeds(),
                num_beams: cube.num_beams(),
            }),

            BeamSource::Models(models) => {
                let selections = models
                    .iter()
                    .enumerate()
                    .map(|(i_beam, model)| {
                        ResponseSelection::new(&model.beam_kind(), polarised, options.power_pol)
                            .map_err(|err| VisError::IncompatibleBeam { beam: i_beam, err })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let (num_axes, num_feeds) = if polarised { (2, 2) } else { (1, 1) };
                debug_assert!(selections
                    .iter()
                    .all(|s| s.num_axes_feeds() == (num_axes, num_feeds)));
                Ok(BeamEvaluator::Direct {
                    models,
                    selections,
                    model_opts: options.model_opts,
                    freq_hz,
                    num_axes,
                    num_feeds,
                })
            }
        }
    }

    /// Evaluate every logical beam towards each direction. `east` and `north`
    /// are the topocentric direction cosines of the directions.
    ///
    /// The result has shape `(num_axes, num_feeds, num_beams, num_dirs)`.
    pub(crate) fn evaluate(
        &self,
        east: ArrayView1<F>,
        north: ArrayView1<F>,
    ) -> Result<Array4<Complex<F>>, BeamError> {
        let num_dirs = east.len();
        match self {
            BeamEvaluator::Pixel {
                interpolants,
                num_axes,
                num_feeds,
                num_beams,
            } => {
                let mut amps = Array4::zeros((*num_axes, *num_feeds, *num_beams, num_dirs));
                for (i_axis, mut amps) in amps.outer_iter_mut().enumerate() {
                    for (i_feed, mut amps) in amps.outer_iter_mut().enumerate() {
                        for (i_beam, amps) in amps.outer_iter_mut().enumerate() {
                            interpolants
                                .get(i_axis, i_feed, i_beam)
                                .eval_batch(east, north, amps);
                        }
                    }
                }
                Ok(amps)
            }

            BeamEvaluator::Direct {
                models,
                selections,
                model_opts,
                freq_hz,
                num_axes,
                num_feeds,
            } => {
                let mut amps =
                    Array4::zeros((*num_axes, *num_feeds, models.len(), num_dirs));
                if num_dirs == 0 {
                    return Ok(amps);
                }

                // Beam models are always evaluated in double precision.
                let (az, za): (Vec<f64>, Vec<f64>) = east
                    .iter()
                    .zip(north.iter())
                    .map(|(&l, &m)| lm_to_az_za(l.as_f64(), m.as_f64()))
                    .unzip();

                for (i_beam, (model, selection)) in
                    models.iter().zip(selections.iter()).enumerate()
                {
                    let response = model.interp(&az, &za, &[*freq_hz], *model_opts)?;
                    let beam_amps = selection.select(response.view(), num_dirs)?;
                    amps.slice_mut(s![.., .., i_beam, ..])
                        .zip_mut_with(&beam_amps, |a, &b| {
                            *a = Complex::new(F::from_f64(b.re), F::from_f64(b.im))
                        });
                }
                Ok(amps)
            }
        }
    }
}

/// Find the first logical beam with a non-finite amplitude, if any.
pub(crate) fn first_non_finite_beam<F: VisFloat>(amps: ArrayView4<Complex<F>>) -> Option<usize> {
    amps.axis_iter(Axis(2))
        .position(|beam| beam.iter().any(|a| !(a.re.is_finite() && a.im.is_finite())))
}
