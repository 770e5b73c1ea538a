// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::*;
use marlu::c64;
use ndarray::prelude::*;
use parking_lot::Mutex;

use super::{pixel::GridInterpolant, *};
use crate::{
    analytic::{AnalyticBeam, AnalyticResponse},
    direction::lm_to_az_za,
};

/// A plane `a + b*l + c*m` sampled on an `n` x `n` grid.
fn plane(n: usize) -> Array2<c64> {
    Array2::from_shape_fn((n, n), |(i_m, i_l)| {
        let l = -1.0 + 2.0 * i_l as f64 / (n - 1) as f64;
        let m = -1.0 + 2.0 * i_m as f64 / (n - 1) as f64;
        c64::new(0.3 + 0.5 * l - 0.2 * m, 0.1 * l + 0.7 * m)
    })
}

fn plane_value(l: f64, m: f64) -> c64 {
    c64::new(0.3 + 0.5 * l - 0.2 * m, 0.1 * l + 0.7 * m)
}

#[test]
fn test_linear_is_exact_for_planes() {
    let values = plane(9);
    let interp = GridInterpolant::<f64>::new(values.view(), InterpolationOrder::Linear);
    for (l, m) in [(0.0, 0.0), (0.13, -0.41), (-0.99, 0.99), (0.5, 0.5)] {
        assert_abs_diff_eq!(interp.eval(l, m), plane_value(l, m), epsilon = 1e-12);
    }
}

#[test]
fn test_cubic_is_exact_for_planes_inside() {
    // Catmull-Rom reproduces linear functions away from the edges.
    let values = plane(11);
    let interp = GridInterpolant::<f64>::new(values.view(), InterpolationOrder::Cubic);
    for (l, m) in [(0.0, 0.0), (0.13, -0.41), (-0.55, 0.62)] {
        assert_abs_diff_eq!(interp.eval(l, m), plane_value(l, m), epsilon = 1e-12);
    }
}

#[test]
fn test_all_orders_hit_grid_nodes() {
    let n = 7;
    let values = Array2::from_shape_fn((n, n), |(i, j)| c64::new((i * n + j) as f64, -(j as f64)));
    for order in [
        InterpolationOrder::Nearest,
        InterpolationOrder::Linear,
        InterpolationOrder::Cubic,
    ] {
        let interp = GridInterpolant::<f64>::new(values.view(), order);
        for ((i_m, i_l), &expected) in values.indexed_iter() {
            let l = -1.0 + 2.0 * i_l as f64 / (n - 1) as f64;
            let m = -1.0 + 2.0 * i_m as f64 / (n - 1) as f64;
            assert_abs_diff_eq!(interp.eval(l, m), expected, epsilon = 1e-10);
        }
    }
}

#[test]
fn test_out_of_grid_is_clamped() {
    let values = plane(5);
    for order in [
        InterpolationOrder::Nearest,
        InterpolationOrder::Linear,
        InterpolationOrder::Cubic,
    ] {
        let interp = GridInterpolant::<f64>::new(values.view(), order);
        assert_abs_diff_eq!(interp.eval(1.5, 0.0), interp.eval(1.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(interp.eval(-3.0, -2.0), values[[0, 0]], epsilon = 1e-12);
        assert_abs_diff_eq!(interp.eval(2.0, 2.0), values[[4, 4]], epsilon = 1e-12);
    }
}

#[test]
fn test_nearest_picks_closest_pixel() {
    let values = array![
        [c64::new(1.0, 0.0), c64::new(2.0, 0.0)],
        [c64::new(3.0, 0.0), c64::new(4.0, 0.0)]
    ];
    let interp = GridInterpolant::<f64>::new(values.view(), InterpolationOrder::Nearest);
    // Row is m, column is l.
    assert_abs_diff_eq!(interp.eval(0.6, -0.6), c64::new(2.0, 0.0));
    assert_abs_diff_eq!(interp.eval(-0.6, 0.6), c64::new(3.0, 0.0));
}

#[test]
fn test_single_precision_interpolant() {
    let values = plane(9);
    let interp = GridInterpolant::<f32>::new(values.view(), InterpolationOrder::Linear);
    let result = interp.eval(0.21, -0.37);
    let expected = plane_value(0.21, -0.37);
    assert_abs_diff_eq!(result.re as f64, expected.re, epsilon = 1e-5);
    assert_abs_diff_eq!(result.im as f64, expected.im, epsilon = 1e-5);
}

#[test]
fn test_cube_constructors() {
    let real = Array3::from_elem((3, 4, 4), 0.5);
    let cube = PixelBeamCube::from_real_scalar(real.view()).unwrap();
    assert_eq!(cube.num_axes(), 1);
    assert_eq!(cube.num_feeds(), 1);
    assert_eq!(cube.num_beams(), 3);
    assert_eq!(cube.num_pix(), 4);
    assert_abs_diff_eq!(cube.view()[[0, 0, 2, 3, 1]], c64::new(0.5, 0.0));

    let complex = Array3::from_elem((2, 3, 3), c64::new(0.0, 1.0));
    let cube = PixelBeamCube::from_complex_scalar(complex.view()).unwrap();
    assert_eq!(cube.view().dim(), (1, 1, 2, 3, 3));

    let cube = PixelBeamCube::new(Array5::zeros((2, 2, 1, 5, 5))).unwrap();
    assert_eq!(cube.num_axes(), 2);
}

#[test]
fn test_cube_shape_errors() {
    assert!(matches!(
        PixelBeamCube::new(Array5::zeros((1, 1, 1, 4, 5))),
        Err(BeamError::PixelGridShape { rows: 4, cols: 5 })
    ));
    assert!(matches!(
        PixelBeamCube::from_real_scalar(Array3::zeros((1, 1, 1)).view()),
        Err(BeamError::PixelGridShape { rows: 1, cols: 1 })
    ));
}

#[test]
fn test_from_models_matches_direct_evaluation() {
    let sigma = 0.4;
    let beam = AnalyticBeam::new_gaussian(sigma, AnalyticResponse::Power).unwrap();
    let models: [&dyn BeamModel; 1] = [&beam];
    let n = 21;
    let options = BeamInterpOptions::default();
    let cube = PixelBeamCube::from_models(&models, 150e6, n, false, &options).unwrap();
    assert_eq!(cube.view().dim(), (1, 1, 1, n, n));

    // Pixel (i_m, i_l) = (10, 15) is at l = 0.5, m = 0.
    let (_, za) = lm_to_az_za(0.5_f64, 0.0);
    let expected = (-(za * za) / (2.0 * sigma * sigma)).exp();
    assert_abs_diff_eq!(cube.view()[[0, 0, 0, 10, 15]].re, expected, epsilon = 1e-12);

    // Corners are beyond the horizon; they're put on it.
    let (_, za) = lm_to_az_za(1.0_f64, 1.0);
    let expected = (-(za * za) / (2.0 * sigma * sigma)).exp();
    assert_abs_diff_eq!(cube.view()[[0, 0, 0, n - 1, n - 1]].re, expected, epsilon = 1e-12);
}

#[test]
fn test_from_models_polarised() {
    let beam = AnalyticBeam::new_uniform(AnalyticResponse::EField);
    let models: [&dyn BeamModel; 2] = [&beam, &beam];
    let options = BeamInterpOptions::default();
    let cube = PixelBeamCube::from_models(&models, 150e6, 3, true, &options).unwrap();
    assert_eq!(cube.view().dim(), (2, 2, 2, 3, 3));
    assert_abs_diff_eq!(cube.view()[[1, 0, 1, 1, 1]], c64::new(1.0, 0.0));
    assert_abs_diff_eq!(cube.view()[[0, 0, 1, 1, 1]], c64::default());

    // A power beam can't be used for polarised cubes.
    let power = AnalyticBeam::new_uniform(AnalyticResponse::Power);
    let models: [&dyn BeamModel; 1] = [&power];
    assert!(matches!(
        PixelBeamCube::from_models(&models, 150e6, 3, true, &options),
        Err(BeamError::PolarisedNeedsEField { .. })
    ));
}

#[test]
fn test_response_selection() {
    let efield = BeamKind::EField {
        num_axes: 2,
        num_feeds: 2,
    };
    let power = BeamKind::Power {
        pols: vec![PowerPol::XX, PowerPol::YY],
    };

    assert_eq!(
        ResponseSelection::new(&efield, true, PowerPol::XX).unwrap(),
        ResponseSelection::Jones
    );
    assert_eq!(
        ResponseSelection::new(&power, false, PowerPol::YY).unwrap(),
        ResponseSelection::PowerAmplitude { pol_index: 1 }
    );
    assert!(matches!(
        ResponseSelection::new(&efield, false, PowerPol::XX),
        Err(BeamError::ScalarNeedsPower { .. })
    ));
    assert!(matches!(
        ResponseSelection::new(&power, true, PowerPol::XX),
        Err(BeamError::PolarisedNeedsEField { .. })
    ));
    assert!(matches!(
        ResponseSelection::new(&power, false, PowerPol::XY),
        Err(BeamError::CrossPowerPol(PowerPol::XY))
    ));

    let xx_only = BeamKind::Power {
        pols: vec![PowerPol::XX],
    };
    assert!(matches!(
        ResponseSelection::new(&xx_only, false, PowerPol::YY),
        Err(BeamError::MissingPowerPol {
            pol: PowerPol::YY,
            ..
        })
    ));

    let single_feed = BeamKind::EField {
        num_axes: 2,
        num_feeds: 1,
    };
    assert!(matches!(
        ResponseSelection::new(&single_feed, true, PowerPol::XX),
        Err(BeamError::PolarisedNeedsEField { .. })
    ));
}

#[test]
fn test_power_amplitude_is_sqrt() {
    let response = Array4::from_shape_fn((1, 2, 1, 3), |(_, i_pol, _, i_dir)| {
        c64::new((i_pol * 3 + i_dir) as f64, 0.0)
    });
    let amps = ResponseSelection::PowerAmplitude { pol_index: 1 }
        .select(response.view(), 3)
        .unwrap();
    assert_eq!(amps.dim(), (1, 1, 3));
    assert_abs_diff_eq!(amps[[0, 0, 0]].re, 3.0_f64.sqrt());
    assert_abs_diff_eq!(amps[[0, 0, 2]].re, 5.0_f64.sqrt());

    // Negative power doesn't have a real amplitude.
    let negative = Array4::from_elem((1, 1, 1, 1), c64::new(-1.0, 0.0));
    let amps = ResponseSelection::PowerAmplitude { pol_index: 0 }
        .select(negative.view(), 1)
        .unwrap();
    assert!(amps[[0, 0, 0]].re.is_nan());
}

#[test]
fn test_selection_rejects_bad_shapes() {
    let response = Array4::<c64>::zeros((2, 2, 1, 4));
    assert!(matches!(
        ResponseSelection::Jones.select(response.view(), 3),
        Err(BeamError::ResponseShape { .. })
    ));
    assert!(matches!(
        ResponseSelection::PowerAmplitude { pol_index: 0 }.select(response.view(), 4),
        Err(BeamError::ResponseShape { .. })
    ));
}

#[test]
fn test_evaluator_pixel_and_direct_agree() {
    let sigma = 0.5;
    let beam = AnalyticBeam::new_gaussian(sigma, AnalyticResponse::Power).unwrap();
    let models: [&dyn BeamModel; 1] = [&beam];
    let options = BeamInterpOptions::default();
    let cube = PixelBeamCube::from_models(&models, 150e6, 201, false, &options).unwrap();

    let pixel = BeamEvaluator::<f64>::new(
        evaluator::BeamSource::Pixel(&cube),
        false,
        &options,
        150e6,
    )
    .unwrap();
    let direct = BeamEvaluator::<f64>::new(
        evaluator::BeamSource::Models(&models),
        false,
        &options,
        150e6,
    )
    .unwrap();

    let east = array![0.0, 0.1, -0.3, 0.25];
    let north = array![0.0, 0.2, 0.05, -0.4];
    let from_pixels = pixel.evaluate(east.view(), north.view()).unwrap();
    let from_models = direct.evaluate(east.view(), north.view()).unwrap();
    assert_eq!(from_pixels.dim(), (1, 1, 1, 4));
    assert_eq!(from_models.dim(), (1, 1, 1, 4));
    for (p, d) in from_pixels.iter().zip(from_models.iter()) {
        assert_abs_diff_eq!(p.re, d.re, epsilon = 1e-3);
    }
}

/// Options for [`OptionsRecordingBeam`].
#[derive(Debug, PartialEq)]
struct SplineDegrees {
    kx: usize,
    ky: usize,
}

/// A uniform power beam that remembers the options of every `interp` call.
#[derive(Default)]
struct OptionsRecordingBeam {
    seen: Mutex<Vec<Option<(usize, usize)>>>,
}

impl BeamModel for OptionsRecordingBeam {
    fn beam_kind(&self) -> BeamKind {
        BeamKind::Power {
            pols: vec![PowerPol::XX],
        }
    }

    fn interp(
        &self,
        az_rad: &[f64],
        _za_rad: &[f64],
        freqs_hz: &[f64],
        model_opts: ModelOptions,
    ) -> Result<Array4<c64>, BeamError> {
        let degrees = model_opts
            .and_then(|opts| opts.downcast_ref::<SplineDegrees>())
            .map(|d| (d.kx, d.ky));
        self.seen.lock().push(degrees);
        Ok(Array4::from_elem(
            (1, 1, freqs_hz.len(), az_rad.len()),
            c64::new(1.0, 0.0),
        ))
    }
}

#[test]
fn test_model_options_are_forwarded() {
    let beam = OptionsRecordingBeam::default();
    let models: [&dyn BeamModel; 1] = [&beam];
    let degrees = SplineDegrees { kx: 3, ky: 1 };
    let options = BeamInterpOptions {
        model_opts: Some(&degrees),
        ..Default::default()
    };

    PixelBeamCube::from_models(&models, 150e6, 4, false, &options).unwrap();
    let direct = BeamEvaluator::<f32>::new(
        evaluator::BeamSource::Models(&models),
        false,
        &options,
        150e6,
    )
    .unwrap();
    direct
        .evaluate(array![0.1].view(), array![-0.2].view())
        .unwrap();

    // Without options, models are told so.
    let direct = BeamEvaluator::<f32>::new(
        evaluator::BeamSource::Models(&models),
        false,
        &BeamInterpOptions::default(),
        150e6,
    )
    .unwrap();
    direct
        .evaluate(array![0.1].view(), array![-0.2].view())
        .unwrap();

    assert_eq!(*beam.seen.lock(), vec![Some((3, 1)), Some((3, 1)), None]);
}

#[test]
fn test_evaluator_rejects_incompatible_models() {
    let beam = AnalyticBeam::new_uniform(AnalyticResponse::EField);
    let power = AnalyticBeam::new_uniform(AnalyticResponse::Power);
    let models: [&dyn BeamModel; 2] = [&power, &beam];
    let result = BeamEvaluator::<f32>::new(
        evaluator::BeamSource::Models(&models),
        false,
        &BeamInterpOptions::default(),
        150e6,
    );
    assert!(matches!(
        result,
        Err(crate::vis::VisError::IncompatibleBeam {
            beam: 1,
            err: BeamError::ScalarNeedsPower { .. }
        })
    ));
}

#[test]
fn test_first_non_finite_beam() {
    let mut amps = Array4::<num_complex::Complex<f32>>::zeros((1, 1, 3, 2));
    assert_eq!(evaluator::first_non_finite_beam(amps.view()), None);
    amps[[0, 0, 2, 1]].im = f32::INFINITY;
    amps[[0, 0, 1, 0]].re = f32::NAN;
    assert_eq!(evaluator::first_non_finite_beam(amps.view()), Some(1));
}
