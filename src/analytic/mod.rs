// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code for analytic, azimuthally-symmetric antenna beams.

mod error;

pub use error::AnalyticBeamError;

use std::f64::consts::{FRAC_PI_2, PI};

use marlu::c64;
use ndarray::prelude::*;
use rayon::prelude::*;

use crate::{
    beam::{BeamError, BeamKind, BeamModel, ModelOptions},
    constants::{AIRY_GAUSSIAN_SCALAR, FWHM_PER_SIGMA, VEL_C},
    direction::ZenithAngle,
    PowerPol,
};

/// The shape of an analytic beam.
#[derive(Clone, Copy, Debug)]
pub enum AnalyticType {
    /// The same response in every direction above the horizon.
    Uniform,

    /// A Gaussian in zenith angle with a fixed width \[radians\], independent
    /// of frequency.
    Gaussian { sigma_rad: f64 },

    /// A Gaussian in zenith angle whose width is that of the Airy disk of a
    /// dish with this diameter \[metres\]; the width scales with wavelength.
    GaussianDish { diameter_m: f64 },
}

/// Whether an analytic beam reports electric-field or power responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalyticResponse {
    /// A 2x2 Jones response per direction. The feeds are the (azimuthal,
    /// zenith-angle) unit vectors swapped, as is conventional for analytic
    /// beams.
    EField,

    /// XX, YY, XY and YX power responses per direction.
    Power,
}

/// The struct used to calculate responses for the analytic beams.
pub struct AnalyticBeam {
    beam_type: AnalyticType,
    response: AnalyticResponse,
}

impl AnalyticBeam {
    /// Create a new [`AnalyticBeam`] with a uniform response.
    pub fn new_uniform(response: AnalyticResponse) -> AnalyticBeam {
        AnalyticBeam {
            beam_type: AnalyticType::Uniform,
            response,
        }
    }

    /// Create a new Gaussian [`AnalyticBeam`] with a fixed width (standard
    /// deviation of the E-field response) \[radians\].
    pub fn new_gaussian(
        sigma_rad: f64,
        response: AnalyticResponse,
    ) -> Result<AnalyticBeam, AnalyticBeamError> {
        if !(sigma_rad.is_finite() && sigma_rad > 0.0) {
            return Err(AnalyticBeamError::BadSigma(sigma_rad));
        }
        Ok(AnalyticBeam {
            beam_type: AnalyticType::Gaussian { sigma_rad },
            response,
        })
    }

    /// Create a new Gaussian [`AnalyticBeam`] mimicking a dish with the given
    /// effective diameter \[metres\].
    pub fn new_gaussian_dish(
        diameter_m: f64,
        response: AnalyticResponse,
    ) -> Result<AnalyticBeam, AnalyticBeamError> {
        if !(diameter_m.is_finite() && diameter_m > 0.0) {
            return Err(AnalyticBeamError::BadDiameter(diameter_m));
        }
        Ok(AnalyticBeam {
            beam_type: AnalyticType::GaussianDish { diameter_m },
            response,
        })
    }

    pub fn get_beam_type(&self) -> AnalyticType {
        self.beam_type
    }

    /// Get the width (standard deviation) of the E-field response at a
    /// frequency \[Hz\]. A uniform beam has no width and gives `None`.
    pub fn get_sigma(&self, freq_hz: f64) -> Result<Option<f64>, AnalyticBeamError> {
        match self.beam_type {
            AnalyticType::Uniform => Ok(None),
            AnalyticType::Gaussian { sigma_rad } => Ok(Some(sigma_rad)),
            AnalyticType::GaussianDish { diameter_m } => {
                diameter_to_sigma(diameter_m, freq_hz).map(Some)
            }
        }
    }

    /// Calculate the E-field amplitude for a given direction.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::f64::consts::FRAC_PI_2;
    ///
    /// use marlu::AzEl;
    /// use hypervis::analytic::{AnalyticBeam, AnalyticResponse};
    ///
    /// let beam = AnalyticBeam::new_gaussian_dish(14.0, AnalyticResponse::Power).unwrap();
    /// let zenith = beam.calc_amplitude(AzEl::from_radians(0.0, FRAC_PI_2), 150e6).unwrap();
    /// assert_eq!(zenith, 1.0);
    ///
    /// // Floats can be used too; these are (azimuth, zenith angle).
    /// let off_zenith = beam.calc_amplitude((0.0, 0.3), 150e6).unwrap();
    /// assert!(off_zenith < zenith);
    /// ```
    pub fn calc_amplitude<C: ZenithAngle>(
        &self,
        direction: C,
        freq_hz: f64,
    ) -> Result<f64, AnalyticBeamError> {
        check_freq(freq_hz)?;
        let sigma = self.get_sigma(freq_hz)?;
        calc_amplitude_inner(direction.za_rad(), sigma)
    }

    /// Calculate the E-field amplitudes for many directions. This is
    /// basically a wrapper around `calc_amplitude` that efficiently calculates
    /// the amplitudes in parallel. The number of parallel threads used can be
    /// controlled by setting `RAYON_NUM_THREADS`.
    pub fn calc_amplitude_array<C, I, I2>(
        &self,
        directions: I,
        freq_hz: f64,
    ) -> Result<Vec<f64>, AnalyticBeamError>
    where
        C: ZenithAngle,
        I: IntoParallelIterator<Iter = I2>,
        I2: IndexedParallelIterator<Item = C>,
    {
        let directions = directions.into_par_iter();
        let mut results = vec![0.0; directions.len()];
        self.calc_amplitude_array_inner(directions, freq_hz, &mut results)?;
        Ok(results)
    }

    /// The same as `calc_amplitude_array` but uses pre-allocated memory.
    /// `results` should have a length equal to or greater than `directions`.
    pub fn calc_amplitude_array_inner<C, I, I2>(
        &self,
        directions: I,
        freq_hz: f64,
        results: &mut [f64],
    ) -> Result<(), AnalyticBeamError>
    where
        C: ZenithAngle,
        I: IntoParallelIterator<Iter = I2>,
        I2: IndexedParallelIterator<Item = C>,
    {
        check_freq(freq_hz)?;
        let sigma = self.get_sigma(freq_hz)?;
        directions
            .into_par_iter()
            .zip(results.par_iter_mut())
            .try_for_each(|(dir, result)| {
                *result = calc_amplitude_inner(dir.za_rad(), sigma)?;
                Ok(())
            })
    }
}

impl BeamModel for AnalyticBeam {
    fn beam_kind(&self) -> BeamKind {
        match self.response {
            AnalyticResponse::EField => BeamKind::EField {
                num_axes: 2,
                num_feeds: 2,
            },
            AnalyticResponse::Power => BeamKind::Power {
                pols: vec![PowerPol::XX, PowerPol::YY, PowerPol::XY, PowerPol::YX],
            },
        }
    }

    fn interp(
        &self,
        az_rad: &[f64],
        za_rad: &[f64],
        freqs_hz: &[f64],
        _model_opts: ModelOptions,
    ) -> Result<Array4<c64>, BeamError> {
        if az_rad.len() != za_rad.len() {
            return Err(BeamError::AzZaLengthMismatch {
                num_az: az_rad.len(),
                num_za: za_rad.len(),
            });
        }
        if freqs_hz.is_empty() {
            return Err(BeamError::NoFreqs);
        }

        let num_dirs = az_rad.len();
        let mut response = match self.response {
            AnalyticResponse::EField => Array4::zeros((2, 2, freqs_hz.len(), num_dirs)),
            AnalyticResponse::Power => Array4::zeros((1, 4, freqs_hz.len(), num_dirs)),
        };
        let mut amps = vec![0.0; num_dirs];
        for (i_freq, &freq_hz) in freqs_hz.iter().enumerate() {
            self.calc_amplitude_array_inner(
                (az_rad, za_rad).into_par_iter(),
                freq_hz,
                &mut amps,
            )?;

            match self.response {
                AnalyticResponse::EField => {
                    for (i_dir, &amp) in amps.iter().enumerate() {
                        response[[1, 0, i_freq, i_dir]] = c64::new(amp, 0.0);
                        response[[0, 1, i_freq, i_dir]] = c64::new(amp, 0.0);
                    }
                }
                AnalyticResponse::Power => {
                    // Only the auto-pols have power; the cross-pols stay zero.
                    for (i_dir, &amp) in amps.iter().enumerate() {
                        response[[0, 0, i_freq, i_dir]] = c64::new(amp * amp, 0.0);
                        response[[0, 1, i_freq, i_dir]] = c64::new(amp * amp, 0.0);
                    }
                }
            }
        }

        Ok(response)
    }
}

/// Get the E-field amplitude at a zenith angle for a beam width. A `sigma` of
/// `None` means the beam is uniform.
fn calc_amplitude_inner(za_rad: f64, sigma: Option<f64>) -> Result<f64, AnalyticBeamError> {
    if za_rad > FRAC_PI_2 {
        return Err(AnalyticBeamError::BelowHorizon { za: za_rad });
    }
    Ok(match sigma {
        None => 1.0,
        Some(sigma) => (-(za_rad * za_rad) / (2.0 * sigma * sigma)).exp(),
    })
}

/// Convert an effective dish diameter \[metres\] into the width of a Gaussian
/// fit to the dish's Airy disk at a frequency \[Hz\].
fn diameter_to_sigma(diameter_m: f64, freq_hz: f64) -> Result<f64, AnalyticBeamError> {
    let lambda_m = VEL_C / freq_hz;
    let arg = AIRY_GAUSSIAN_SCALAR * lambda_m / (PI * diameter_m);
    if arg > 1.0 {
        return Err(AnalyticBeamError::DishTooSmall {
            diameter_m,
            freq_hz,
        });
    }
    Ok(arg.asin() * 2.0 / FWHM_PER_SIGMA)
}

fn check_freq(freq_hz: f64) -> Result<(), AnalyticBeamError> {
    if freq_hz.is_finite() && freq_hz > 0.0 {
        Ok(())
    } else {
        Err(AnalyticBeamError::BadFreq(freq_hz))
    }
}
