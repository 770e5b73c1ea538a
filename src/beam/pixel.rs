// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Beams sampled on a regular grid of direction cosines, and interpolants over
//! them.

use marlu::c64;
use ndarray::prelude::*;
use num_complex::Complex;
use num_traits::ToPrimitive;

use super::{BeamError, BeamInterpOptions, BeamModel, ResponseSelection};
use crate::{direction::lm_to_az_za, VisFloat};

/// How values between the pixels of a [`PixelBeamCube`] are obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InterpolationOrder {
    /// Use the nearest pixel.
    Nearest,

    /// Bilinear interpolation (degree 1 in both axes).
    #[default]
    Linear,

    /// Cubic-convolution (Catmull-Rom) interpolation. Edge pixels are
    /// replicated outside the grid.
    Cubic,
}

/// Beam amplitudes sampled over the projected sky. The grid spans [-1, 1] in
/// both direction cosines; the second-last axis indexes `m` (north) and the
/// last axis indexes `l` (east).
///
/// The full shape is `(num_axes, num_feeds, num_beams, num_pix, num_pix)`.
/// Unpolarised cubes have one axis and one feed.
#[derive(Debug, Clone)]
pub struct PixelBeamCube {
    data: Array5<c64>,
}

impl PixelBeamCube {
    /// Create a new [`PixelBeamCube`] from a full
    /// `(num_axes, num_feeds, num_beams, num_pix, num_pix)` array.
    pub fn new(data: Array5<c64>) -> Result<PixelBeamCube, BeamError> {
        let (_, _, _, rows, cols) = data.dim();
        if rows != cols || rows < 2 {
            return Err(BeamError::PixelGridShape { rows, cols });
        }
        Ok(PixelBeamCube { data })
    }

    /// Create an unpolarised [`PixelBeamCube`] from real amplitudes with shape
    /// `(num_beams, num_pix, num_pix)`.
    pub fn from_real_scalar(cube: ArrayView3<f64>) -> Result<PixelBeamCube, BeamError> {
        let data = cube
            .mapv(|v| c64::new(v, 0.0))
            .insert_axis(Axis(0))
            .insert_axis(Axis(0));
        Self::new(data)
    }

    /// Create an unpolarised [`PixelBeamCube`] from complex amplitudes with
    /// shape `(num_beams, num_pix, num_pix)`.
    pub fn from_complex_scalar(cube: ArrayView3<c64>) -> Result<PixelBeamCube, BeamError> {
        let data = cube.to_owned().insert_axis(Axis(0)).insert_axis(Axis(0));
        Self::new(data)
    }

    /// Rasterise [`BeamModel`]s onto a `num_pix` x `num_pix` grid at a single
    /// frequency \[Hz\], one logical beam per model.
    ///
    /// If `polarised` is true, each model must be a 2x2 E-field beam and the
    /// full Jones response is kept. Otherwise each model must be a power beam
    /// with `options.power_pol`, and the square root of that power is kept.
    /// `options.model_opts` is handed to each model.
    pub fn from_models(
        models: &[&dyn BeamModel],
        freq_hz: f64,
        num_pix: usize,
        polarised: bool,
        options: &BeamInterpOptions,
    ) -> Result<PixelBeamCube, BeamError> {
        if num_pix < 2 {
            return Err(BeamError::PixelGridShape {
                rows: num_pix,
                cols: num_pix,
            });
        }

        // Row-major over (m, l).
        let (az, za): (Vec<f64>, Vec<f64>) = (0..num_pix)
            .flat_map(|i_m| (0..num_pix).map(move |i_l| (i_m, i_l)))
            .map(|(i_m, i_l)| lm_to_az_za(grid_coord(i_l, num_pix), grid_coord(i_m, num_pix)))
            .unzip();
        let num_dirs = az.len();

        let (num_axes, num_feeds) = if polarised { (2, 2) } else { (1, 1) };
        let mut data = Array5::zeros((num_axes, num_feeds, models.len(), num_pix, num_pix));
        for (i_beam, model) in models.iter().enumerate() {
            let selection =
                ResponseSelection::new(&model.beam_kind(), polarised, options.power_pol)?;
            let response = model.interp(&az, &za, &[freq_hz], options.model_opts)?;
            let amps = selection.select(response.view(), num_dirs)?;
            for ((i_axis, i_feed, i_dir), &amp) in amps.indexed_iter() {
                data[[i_axis, i_feed, i_beam, i_dir / num_pix, i_dir % num_pix]] = amp;
            }
        }

        Ok(PixelBeamCube { data })
    }

    pub fn num_axes(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn num_feeds(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn num_beams(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// The number of pixels along each side of the grid.
    pub fn num_pix(&self) -> usize {
        self.data.len_of(Axis(3))
    }

    pub fn view(&self) -> ArrayView5<c64> {
        self.data.view()
    }
}

/// The direction cosine of pixel `i` along a grid axis with `num_pix` pixels.
fn grid_coord(i: usize, num_pix: usize) -> f64 {
    -1.0 + 2.0 * i as f64 / (num_pix - 1) as f64
}

/// An interpolant over a single (axis, feed, beam) plane of a
/// [`PixelBeamCube`], with its samples cast to the working precision.
pub(crate) struct GridInterpolant<F: VisFloat> {
    values: Array2<Complex<F>>,
    order: InterpolationOrder,
    /// Pixels per unit direction cosine.
    scale: F,
    /// The biggest fractional pixel index.
    max_index: F,
}

impl<F: VisFloat> GridInterpolant<F> {
    pub(crate) fn new(plane: ArrayView2<c64>, order: InterpolationOrder) -> GridInterpolant<F> {
        let num_pix = plane.len_of(Axis(0));
        let max_index = F::from_f64((num_pix - 1) as f64);
        GridInterpolant {
            values: plane.mapv(|v| Complex::new(F::from_f64(v.re), F::from_f64(v.im))),
            order,
            scale: max_index / F::from_f64(2.0),
            max_index,
        }
    }

    /// Convert a direction cosine into a fractional pixel index, clamped to the
    /// grid.
    fn frac_index(&self, x: F) -> F {
        ((x + F::one()) * self.scale).max(F::zero()).min(self.max_index)
    }

    /// Split a fractional pixel index into the lower of the two bracketing
    /// pixels and the offset from it (in [0, 1]).
    fn bracket(&self, u: F) -> (usize, F) {
        let last = self.values.len_of(Axis(0)) - 2;
        let i = u.floor().to_usize().unwrap_or(0).min(last);
        (i, u - F::from_f64(i as f64))
    }

    /// Interpolate at a single (`l`, `m`) direction.
    pub(crate) fn eval(&self, l: F, m: F) -> Complex<F> {
        let u = self.frac_index(l);
        let v = self.frac_index(m);
        match self.order {
            InterpolationOrder::Nearest => {
                let col = u.round().to_usize().unwrap_or(0);
                let row = v.round().to_usize().unwrap_or(0);
                self.values[[row, col]]
            }

            InterpolationOrder::Linear => {
                let (col, tx) = self.bracket(u);
                let (row, ty) = self.bracket(v);
                let one = F::one();
                let lower =
                    self.values[[row, col]] * (one - tx) + self.values[[row, col + 1]] * tx;
                let upper = self.values[[row + 1, col]] * (one - tx)
                    + self.values[[row + 1, col + 1]] * tx;
                lower * (one - ty) + upper * ty
            }

            InterpolationOrder::Cubic => {
                let (col, tx) = self.bracket(u);
                let (row, ty) = self.bracket(v);
                let wx = catmull_rom_weights(tx);
                let wy = catmull_rom_weights(ty);
                let last = self.values.len_of(Axis(0)) - 1;
                let clamp =
                    |base: usize, offset: usize| (base + offset).saturating_sub(1).min(last);

                let mut result = Complex::new(F::zero(), F::zero());
                for (j, &w_row) in wy.iter().enumerate() {
                    let r = clamp(row, j);
                    let mut row_sum = Complex::new(F::zero(), F::zero());
                    for (i, &w_col) in wx.iter().enumerate() {
                        row_sum = row_sum + self.values[[r, clamp(col, i)]] * w_col;
                    }
                    result = result + row_sum * w_row;
                }
                result
            }
        }
    }

    /// Interpolate at many (`l`, `m`) directions, writing into `out`.
    pub(crate) fn eval_batch(
        &self,
        l: ArrayView1<F>,
        m: ArrayView1<F>,
        mut out: ArrayViewMut1<Complex<F>>,
    ) {
        out.iter_mut()
            .zip(l.iter().zip(m.iter()))
            .for_each(|(out, (&l, &m))| *out = self.eval(l, m));
    }
}

/// Catmull-Rom weights for the samples at offsets -1, 0, 1 and 2 from the
/// lower bracketing pixel.
fn catmull_rom_weights<F: VisFloat>(t: F) -> [F; 4] {
    let half = F::from_f64(0.5);
    let t2 = t * t;
    let t3 = t2 * t;
    let two = F::from_f64(2.0);
    let three = F::from_f64(3.0);
    let four = F::from_f64(4.0);
    let five = F::from_f64(5.0);
    [
        half * (-t3 + two * t2 - t),
        half * (three * t3 - five * t2 + two),
        half * (-three * t3 + four * t2 + t),
        half * (t3 - t2),
    ]
}

/// All of the [`GridInterpolant`]s for a [`PixelBeamCube`], keyed by (axis,
/// feed, beam). These are made once per simulation and only read afterwards.
pub(crate) struct BeamInterpolants<F: VisFloat> {
    interpolants: Vec<GridInterpolant<F>>,
    num_feeds: usize,
    num_beams: usize,
}

impl<F: VisFloat> BeamInterpolants<F> {
    pub(crate) fn new(cube: &PixelBeamCube, order: InterpolationOrder) -> BeamInterpolants<F> {
        let data = cube.view();
        let mut interpolants =
            Vec::with_capacity(cube.num_axes() * cube.num_feeds() * cube.num_beams());
        for axis_planes in data.outer_iter() {
            for feed_planes in axis_planes.outer_iter() {
                for plane in feed_planes.outer_iter() {
                    interpolants.push(GridInterpolant::new(plane, order));
                }
            }
        }
        BeamInterpolants {
            interpolants,
            num_feeds: cube.num_feeds(),
            num_beams: cube.num_beams(),
        }
    }

    pub(crate) fn get(&self, i_axis: usize, i_feed: usize, i_beam: usize) -> &GridInterpolant<F> {
        &self.interpolants[(i_axis * self.num_feeds + i_feed) * self.num_beams + i_beam]
    }
}
