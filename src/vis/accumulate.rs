// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Forming visibilities from voltages.

use ndarray::prelude::*;
use num_complex::Complex;

use crate::VisFloat;

/// Correlate the voltages `v` (shape `(num_feeds * num_ants, num_axes *
/// num_visible)`) and write them into `out`, which has shape `(num_feeds,
/// num_feeds, num_ants, num_ants)`.
///
/// Visibility `(i, j)` is `Σ_k conj(v[i, k]) v[j, k]`, done as one matrix
/// product over all antennas and feeds.
pub(crate) fn accumulate_visibilities<F: VisFloat>(
    v: ArrayView2<Complex<F>>,
    mut out: ArrayViewMut4<Complex<F>>,
) {
    if v.len_of(Axis(1)) == 0 {
        out.fill(Complex::new(F::zero(), F::zero()));
        return;
    }

    let num_ants = out.len_of(Axis(2));
    let m = v.mapv(|v| v.conj()).dot(&v.t());
    for ((f1, f2, a1, a2), out) in out.indexed_iter_mut() {
        *out = m[[f1 * num_ants + a1, f2 * num_ants + a2]];
    }
}
