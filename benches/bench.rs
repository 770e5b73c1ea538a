// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Benchmarks.
 */

use std::f64::consts::PI;

use criterion::*;
use ndarray::prelude::*;

use hypervis::{
    analytic::{AnalyticBeam, AnalyticResponse},
    coords::{get_eq2tops, point_source_crd_eq},
    *,
};

struct Inputs {
    antpos: Array2<f64>,
    eq2tops: Array3<f64>,
    crd_eq: Array2<f64>,
    intensities: Array1<f64>,
}

/// A square grid of antennas 14 m apart and sources scattered over the whole
/// sky.
fn get_inputs(num_ants_per_side: usize, num_srcs: usize, num_times: usize) -> Inputs {
    let mut antpos = Array2::zeros((num_ants_per_side * num_ants_per_side, 3));
    for (i, mut pos) in antpos.outer_iter_mut().enumerate() {
        pos[0] = 14.0 * (i % num_ants_per_side) as f64;
        pos[1] = 14.0 * (i / num_ants_per_side) as f64;
    }
    let ra: Vec<f64> = (0..num_srcs)
        .map(|i| 2.0 * PI * i as f64 / num_srcs as f64)
        .collect();
    let dec: Vec<f64> = (0..num_srcs)
        .map(|i| -PI / 2.0 + PI * ((i * 7) % num_srcs) as f64 / num_srcs as f64)
        .collect();
    let lsts: Vec<f64> = (0..num_times)
        .map(|i| 2.0 * PI * i as f64 / num_times as f64)
        .collect();
    Inputs {
        antpos,
        eq2tops: get_eq2tops(&lsts, (-30.7215_f64).to_radians()),
        crd_eq: point_source_crd_eq(&ra, &dec).unwrap(),
        intensities: Array1::ones(num_srcs),
    }
}

fn vis(c: &mut Criterion) {
    let inputs = get_inputs(8, 1000, 10);
    let freq_ghz = 0.15;
    let beam = AnalyticBeam::new_gaussian_dish(14.0, AnalyticResponse::Power).unwrap();
    let models: [&dyn BeamModel; 1] = [&beam];
    let cube = PixelBeamCube::from_models(
        &models,
        freq_ghz * 1e9,
        63,
        false,
        &BeamInterpOptions::default(),
    )
    .unwrap();

    for (name, precision) in [("single", 1), ("double", 2)] {
        c.bench_function(&format!("vis_cpu_pixels_{name}"), |b| {
            b.iter(|| {
                vis_cpu(
                    inputs.antpos.view(),
                    freq_ghz,
                    inputs.eq2tops.view(),
                    inputs.crd_eq.view(),
                    inputs.intensities.view(),
                    Some(&cube),
                    None,
                    precision,
                    &VisOptions::default(),
                )
                .unwrap();
            })
        });
    }

    c.bench_function("vis_cpu_analytic_single", |b| {
        b.iter(|| {
            vis_cpu(
                inputs.antpos.view(),
                freq_ghz,
                inputs.eq2tops.view(),
                inputs.crd_eq.view(),
                inputs.intensities.view(),
                None,
                Some(&models),
                1,
                &VisOptions::default(),
            )
            .unwrap();
        })
    });

    // The same, but without parallelising over time samples.
    c.bench_function("vis_cpu_pixels_single_serial", |b| {
        let options = VisOptions {
            parallel: false,
            ..Default::default()
        };
        b.iter(|| {
            vis_cpu(
                inputs.antpos.view(),
                freq_ghz,
                inputs.eq2tops.view(),
                inputs.crd_eq.view(),
                inputs.intensities.view(),
                Some(&cube),
                None,
                1,
                &options,
            )
            .unwrap();
        })
    });

    c.bench_function("vis_cpu_polarised_double", |b| {
        let efield = AnalyticBeam::new_gaussian_dish(14.0, AnalyticResponse::EField).unwrap();
        let models: [&dyn BeamModel; 1] = [&efield];
        let options = VisOptions {
            polarised: true,
            ..Default::default()
        };
        b.iter(|| {
            vis_cpu(
                inputs.antpos.view(),
                freq_ghz,
                inputs.eq2tops.view(),
                inputs.crd_eq.view(),
                inputs.intensities.view(),
                None,
                Some(&models),
                2,
                &options,
            )
            .unwrap();
        })
    });
}

fn analytic(c: &mut Criterion) {
    c.bench_function("analytic_calc_amplitude_array", |b| {
        let beam = AnalyticBeam::new_gaussian_dish(14.0, AnalyticResponse::EField).unwrap();
        let az: Vec<f64> = (0..10000).map(|i| i as f64 * 1e-3).collect();
        let za: Vec<f64> = (0..10000).map(|i| i as f64 * 1.5e-4).collect();
        b.iter(|| {
            beam.calc_amplitude_array((az.as_slice(), za.as_slice()), 150e6)
                .unwrap();
        })
    });
}

criterion_group!(benches, vis, analytic);
criterion_main!(benches);
