// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rotating sources into the topocentric frame of a time sample.

use ndarray::prelude::*;

use crate::VisFloat;

/// Sources above the horizon at one time sample.
pub(crate) struct TopoSources<F: VisFloat> {
    /// (east, north, up) direction cosines with shape `(3, num_visible)`.
    pub(crate) crd_top: Array2<F>,
    /// The index of each visible source in the full sky model.
    pub(crate) indices: Vec<usize>,
}

impl<F: VisFloat> TopoSources<F> {
    /// Rotate the equatorial unit vectors `crd_eq` (shape `(3, num_sources)`)
    /// with `eq2top` and keep only sources with a positive up component.
    pub(crate) fn new(eq2top: ArrayView2<F>, crd_eq: ArrayView2<F>) -> TopoSources<F> {
        let crd_top = eq2top.dot(&crd_eq);
        let indices: Vec<usize> = crd_top
            .row(2)
            .iter()
            .enumerate()
            .filter(|(_, &up)| up > F::zero())
            .map(|(i, _)| i)
            .collect();
        // Don't bother copying when everything is up.
        let crd_top = if indices.len() == crd_top.len_of(Axis(1)) {
            crd_top
        } else {
            crd_top.select(Axis(1), &indices)
        };
        TopoSources { crd_top, indices }
    }

    pub(crate) fn num_visible(&self) -> usize {
        self.indices.len()
    }

    pub(crate) fn east(&self) -> ArrayView1<F> {
        self.crd_top.row(0)
    }

    pub(crate) fn north(&self) -> ArrayView1<F> {
        self.crd_top.row(1)
    }
}
