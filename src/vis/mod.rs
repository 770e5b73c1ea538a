// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simulating visibilities from per-antenna voltages.
//!
//! For each time sample, sources are rotated into the topocentric frame and
//! those below the horizon are dropped. Each antenna's beam is evaluated
//! towards the remaining sources, and combined with the geometric delay and
//! source brightness into a voltage. All visibilities of the time sample are
//! then formed at once with a single conjugate matrix product of the voltages.

mod accumulate;
mod error;
mod observer;
mod topo;
mod validate;
mod voltage;

pub use error::VisError;
pub use observer::{Observation, RecordingObserver, Stage, VisObserver};

use std::f64::consts::TAU;

use log::{debug, trace};
use marlu::c64;
use ndarray::prelude::*;
use num_complex::Complex;
use rayon::prelude::*;

use crate::{
    beam::{
        evaluator::first_non_finite_beam, BeamEvaluator, BeamInterpOptions, BeamModel,
        PixelBeamCube,
    },
    constants::{FEED_INTENSITY_FRACTION, HZ_PER_GHZ, VEL_C},
    Precision, VisFloat,
};
use accumulate::accumulate_visibilities;
use topo::TopoSources;
use validate::{validate, ValidatedInputs};
use voltage::compose_voltages;

/// Options for a simulation.
#[derive(Clone)]
pub struct VisOptions<'a> {
    /// Simulate all pairs of polarisation feeds (with 2 axes and 2 feeds)
    /// rather than a single unpolarised visibility per baseline.
    pub polarised: bool,

    /// The logical beam used by each antenna. If this is `None`, a single
    /// beam is used for all antennas, or there must be one beam per antenna.
    pub beam_index: Option<Vec<usize>>,

    /// How beams are interpolated or evaluated, including any options for
    /// the [`BeamModel`]s.
    pub beam_interp: BeamInterpOptions<'a>,

    /// Process time samples in parallel on the rayon thread pool.
    pub parallel: bool,

    /// Something to receive the intermediate products of each time sample.
    pub observer: Option<&'a dyn VisObserver>,
}

impl Default for VisOptions<'_> {
    fn default() -> Self {
        VisOptions {
            polarised: false,
            beam_index: None,
            beam_interp: BeamInterpOptions::default(),
            parallel: true,
            observer: None,
        }
    }
}

/// Simulated visibilities in the working precision.
#[derive(Debug, Clone, PartialEq)]
pub enum VisOutput<F: VisFloat> {
    /// Shape `(num_times, num_ants, num_ants)`.
    Scalar(Array3<Complex<F>>),

    /// Shape `(num_times, num_feeds, num_feeds, num_ants, num_ants)`.
    Polarised(Array5<Complex<F>>),
}

impl<F: VisFloat> VisOutput<F> {
    /// The shape of the underlying array; either 3 or 5 dimensions.
    pub fn shape(&self) -> &[usize] {
        match self {
            VisOutput::Scalar(v) => v.shape(),
            VisOutput::Polarised(v) => v.shape(),
        }
    }

    /// Are there visibilities for each pair of polarisation feeds?
    pub fn is_polarised(&self) -> bool {
        matches!(self, VisOutput::Polarised(_))
    }

    /// Check that no visibility is NaN or infinite.
    pub fn all_finite(&self) -> bool {
        let finite = |v: &Complex<F>| v.re.is_finite() && v.im.is_finite();
        match self {
            VisOutput::Scalar(v) => v.iter().all(finite),
            VisOutput::Polarised(v) => v.iter().all(finite),
        }
    }

    /// Drop the distinction between unpolarised and polarised output.
    pub fn into_dyn(self) -> ArrayD<Complex<F>> {
        match self {
            VisOutput::Scalar(v) => v.into_dyn(),
            VisOutput::Polarised(v) => v.into_dyn(),
        }
    }
}

/// Simulated visibilities from [`vis_cpu`], in whichever precision was asked
/// for.
#[derive(Debug, Clone, PartialEq)]
pub enum Visibilities {
    Single(VisOutput<f32>),
    Double(VisOutput<f64>),
}

impl Visibilities {
    /// The precision the visibilities were simulated in.
    pub fn precision(&self) -> Precision {
        match self {
            Visibilities::Single(_) => Precision::Single,
            Visibilities::Double(_) => Precision::Double,
        }
    }

    /// See [`VisOutput::shape`].
    pub fn shape(&self) -> &[usize] {
        match self {
            Visibilities::Single(v) => v.shape(),
            Visibilities::Double(v) => v.shape(),
        }
    }

    /// See [`VisOutput::all_finite`].
    pub fn all_finite(&self) -> bool {
        match self {
            Visibilities::Single(v) => v.all_finite(),
            Visibilities::Double(v) => v.all_finite(),
        }
    }

    /// Get the visibilities in double precision, whatever precision they were
    /// made in.
    pub fn to_c64(&self) -> ArrayD<c64> {
        match self {
            Visibilities::Single(v) => v
                .clone()
                .into_dyn()
                .mapv(|v| c64::new(v.re.into(), v.im.into())),
            Visibilities::Double(v) => v.clone().into_dyn(),
        }
    }
}

/// Simulate visibilities.
///
/// * `antpos`: antenna positions with shape `(num_ants, 3)` \[metres\].
/// * `freq_ghz`: the frequency \[GHz\].
/// * `eq2tops`: equatorial-to-topocentric rotation matrices, one per time
///   sample, with shape `(num_times, 3, 3)`.
/// * `crd_eq`: Cartesian equatorial unit vectors of the sources with shape
///   `(3, num_sources)`.
/// * `intensities`: non-negative source intensities.
/// * `pixel_beams` or `beam_models`: exactly one must be given.
/// * `precision`: 1 for single precision, 2 for double precision.
///
/// See [`simulate`] for a version generic over the float type.
#[allow(clippy::too_many_arguments)]
pub fn vis_cpu(
    antpos: ArrayView2<f64>,
    freq_ghz: f64,
    eq2tops: ArrayView3<f64>,
    crd_eq: ArrayView2<f64>,
    intensities: ArrayView1<f64>,
    pixel_beams: Option<&PixelBeamCube>,
    beam_models: Option<&[&dyn BeamModel]>,
    precision: u8,
    options: &VisOptions,
) -> Result<Visibilities, VisError> {
    let vis = match Precision::try_from(precision)? {
        Precision::Single => Visibilities::Single(simulate::<f32>(
            antpos,
            freq_ghz,
            eq2tops,
            crd_eq,
            intensities,
            pixel_beams,
            beam_models,
            options,
        )?),
        Precision::Double => Visibilities::Double(simulate::<f64>(
            antpos,
            freq_ghz,
            eq2tops,
            crd_eq,
            intensities,
            pixel_beams,
            beam_models,
            options,
        )?),
    };
    Ok(vis)
}

/// Simulate visibilities with the float type `F`. The arguments are the same
/// as for [`vis_cpu`].
#[allow(clippy::too_many_arguments)]
pub fn simulate<F: VisFloat>(
    antpos: ArrayView2<f64>,
    freq_ghz: f64,
    eq2tops: ArrayView3<f64>,
    crd_eq: ArrayView2<f64>,
    intensities: ArrayView1<f64>,
    pixel_beams: Option<&PixelBeamCube>,
    beam_models: Option<&[&dyn BeamModel]>,
    options: &VisOptions,
) -> Result<VisOutput<F>, VisError> {
    let inputs = validate(
        antpos,
        freq_ghz,
        eq2tops,
        crd_eq,
        intensities,
        pixel_beams,
        beam_models,
        options,
    )?;
    let mut out = Array5::zeros(inputs.output_dim());
    simulate_inner(
        &inputs,
        antpos,
        freq_ghz,
        eq2tops,
        crd_eq,
        intensities,
        options,
        out.view_mut(),
    )?;

    if options.polarised {
        Ok(VisOutput::Polarised(out))
    } else {
        // Drop the singleton feed axes.
        Ok(VisOutput::Scalar(
            out.index_axis_move(Axis(1), 0).index_axis_move(Axis(1), 0),
        ))
    }
}

/// The same as [`simulate`], but writes into `out`, which must have shape
/// `(num_times, num_feeds, num_feeds, num_ants, num_ants)`; `num_feeds` is 1
/// for unpolarised simulations. If an error is returned, the contents of `out`
/// are unspecified.
#[allow(clippy::too_many_arguments)]
pub fn simulate_into<F: VisFloat>(
    antpos: ArrayView2<f64>,
    freq_ghz: f64,
    eq2tops: ArrayView3<f64>,
    crd_eq: ArrayView2<f64>,
    intensities: ArrayView1<f64>,
    pixel_beams: Option<&PixelBeamCube>,
    beam_models: Option<&[&dyn BeamModel]>,
    options: &VisOptions,
    out: ArrayViewMut5<Complex<F>>,
) -> Result<(), VisError> {
    let inputs = validate(
        antpos,
        freq_ghz,
        eq2tops,
        crd_eq,
        intensities,
        pixel_beams,
        beam_models,
        options,
    )?;
    let expected = inputs.output_dim();
    if out.shape() != &expected[..] {
        return Err(VisError::OutputShape {
            expected,
            got: out.shape().to_vec(),
        });
    }
    simulate_inner(
        &inputs,
        antpos,
        freq_ghz,
        eq2tops,
        crd_eq,
        intensities,
        options,
        out,
    )
}

#[allow(clippy::too_many_arguments)]
fn simulate_inner<F: VisFloat>(
    inputs: &ValidatedInputs,
    antpos: ArrayView2<f64>,
    freq_ghz: f64,
    eq2tops: ArrayView3<f64>,
    crd_eq: ArrayView2<f64>,
    intensities: ArrayView1<f64>,
    options: &VisOptions,
    mut out: ArrayViewMut5<Complex<F>>,
) -> Result<(), VisError> {
    let freq_hz = freq_ghz * HZ_PER_GHZ;
    debug!(
        "Simulating {} times, {} antennas, {} sources and {} beams at {freq_hz} Hz in {} precision ({} polarisation axes and feeds, parallel: {})",
        inputs.num_times,
        inputs.num_ants,
        inputs.num_srcs,
        inputs.num_beams,
        F::PRECISION,
        inputs.num_axes,
        options.parallel,
    );

    // Everything is done in the working precision from here on.
    let antpos = antpos.mapv(F::from_f64);
    let eq2tops = eq2tops.mapv(F::from_f64);
    let crd_eq = crd_eq.mapv(F::from_f64);
    let half = F::from_f64(FEED_INTENSITY_FRACTION);
    let amplitudes = intensities.mapv(|i| (F::from_f64(i) * half).sqrt());
    let omega = F::from_f64(TAU * freq_hz);
    let inv_c = F::from_f64(VEL_C).recip();

    // Interpolants are made once here and shared by all time samples.
    let evaluator = BeamEvaluator::<F>::new(
        inputs.beams,
        options.polarised,
        &options.beam_interp,
        freq_hz,
    )?;
    let observer = options.observer;

    let process = |(time_index, mut out): (usize, ArrayViewMut4<_>)| -> Result<(), VisError> {
        let topo = TopoSources::new(eq2tops.index_axis(Axis(0), time_index), crd_eq.view());
        trace!(
            "Time index {time_index}: {} of {} sources are visible",
            topo.num_visible(),
            inputs.num_srcs
        );
        observe(observer, time_index, Stage::Topocentric, || {
            Observation::Topocentric {
                crd_top: topo.crd_top.mapv(F::as_f64),
                visible: topo.indices.clone(),
            }
        });

        let beam_amps = evaluator.evaluate(topo.east(), topo.north())?;
        if let Some(beam) = first_non_finite_beam(beam_amps.view()) {
            return Err(VisError::NonFiniteBeam { time_index, beam });
        }
        observe(observer, time_index, Stage::BeamAmplitudes, || {
            Observation::BeamAmplitudes(to_c64(beam_amps.view()))
        });

        let amplitudes = amplitudes.select(Axis(0), &topo.indices);
        let voltages = compose_voltages(
            antpos.view(),
            topo.crd_top.view(),
            amplitudes.view(),
            omega,
            inv_c,
            beam_amps.view(),
            &inputs.beam_index,
        );
        observe(observer, time_index, Stage::Voltages, || {
            Observation::Voltages(to_c64(voltages.view()))
        });

        accumulate_visibilities(voltages.view(), out.view_mut());
        observe(observer, time_index, Stage::Visibilities, || {
            Observation::Visibilities(to_c64(out.view()))
        });

        Ok(())
    };

    if options.parallel {
        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .try_for_each(process)
    } else {
        out.axis_iter_mut(Axis(0)).enumerate().try_for_each(process)
    }
}

fn observe(
    observer: Option<&dyn VisObserver>,
    time_index: usize,
    stage: Stage,
    observation: impl FnOnce() -> Observation,
) {
    if let Some(observer) = observer {
        if observer.wants(stage) {
            observer.observe(time_index, observation());
        }
    }
}

fn to_c64<F: VisFloat, D: Dimension>(a: ArrayView<Complex<F>, D>) -> Array<c64, D> {
    a.mapv(|v| c64::new(v.re.as_f64(), v.im.as_f64()))
}
