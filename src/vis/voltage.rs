// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-antenna voltages from geometric delays, source brightnesses and beams.

use ndarray::{prelude::*, Zip};
use num_complex::Complex;

use crate::VisFloat;

/// Form the voltage matrix of one time sample.
///
/// `antpos` has shape `(num_ants, 3)` \[metres\], `crd_top` has shape `(3,
/// num_visible)` and `amplitudes` holds the square root of the per-feed
/// intensity of each visible source. `beam_amps` is indexed by (axis, feed,
/// beam, visible source). `omega` is the angular frequency \[rad/s\] and
/// `inv_c` is the reciprocal of the speed of light \[s/m\].
///
/// The result has shape `(num_feeds * num_ants, num_axes * num_visible)`,
/// with row `feed * num_ants + ant` and column `axis * num_visible + source`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn compose_voltages<F: VisFloat>(
    antpos: ArrayView2<F>,
    crd_top: ArrayView2<F>,
    amplitudes: ArrayView1<F>,
    omega: F,
    inv_c: F,
    beam_amps: ArrayView4<Complex<F>>,
    beam_index: &[usize],
) -> Array2<Complex<F>> {
    let (num_axes, num_feeds, _, num_visible) = beam_amps.dim();
    let num_ants = antpos.len_of(Axis(0));

    // Delays are per antenna, not per baseline.
    let tau = antpos.dot(&crd_top);
    let mut voltages: Array2<Complex<F>> = Array2::zeros((num_ants, num_visible));
    Zip::from(&mut voltages)
        .and(&tau)
        .and_broadcast(&amplitudes)
        .for_each(|v, &tau, &amp| {
            *v = Complex::from_polar(amp, omega * tau * inv_c);
        });

    let mut v: Array2<Complex<F>> =
        Array2::zeros((num_feeds * num_ants, num_axes * num_visible));
    for i_feed in 0..num_feeds {
        for (i_ant, (&i_beam, ant_voltages)) in beam_index
            .iter()
            .zip(voltages.outer_iter())
            .enumerate()
        {
            let row = i_feed * num_ants + i_ant;
            for i_axis in 0..num_axes {
                let columns = i_axis * num_visible..(i_axis + 1) * num_visible;
                Zip::from(v.slice_mut(s![row, columns]))
                    .and(beam_amps.slice(s![i_axis, i_feed, i_beam, ..]))
                    .and(&ant_voltages)
                    .for_each(|v, &a, &volt| *v = a * volt);
            }
        }
    }
    v
}
