// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Hooks to inspect the intermediate products of a simulation.

use marlu::c64;
use ndarray::prelude::*;
use parking_lot::Mutex;

/// The steps of a simulation that can be observed, in the order they happen
/// for each time sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Topocentric,
    BeamAmplitudes,
    Voltages,
    Visibilities,
}

/// An intermediate product of one time sample, promoted to double precision.
#[derive(Debug, Clone)]
pub enum Observation {
    /// (east, north, up) direction cosines of the visible sources, with shape
    /// `(3, num_visible)`, and the index of each in the sky model.
    Topocentric {
        crd_top: Array2<f64>,
        visible: Vec<usize>,
    },

    /// Beam amplitudes indexed by (axis, feed, beam, visible source).
    BeamAmplitudes(Array4<c64>),

    /// The voltage matrix, indexed by (feed * num_ants + antenna, axis *
    /// num_visible + source).
    Voltages(Array2<c64>),

    /// This time sample's visibilities, indexed by (feed, feed, antenna,
    /// antenna).
    Visibilities(Array4<c64>),
}

impl Observation {
    pub fn stage(&self) -> Stage {
        match self {
            Observation::Topocentric { .. } => Stage::Topocentric,
            Observation::BeamAmplitudes(_) => Stage::BeamAmplitudes,
            Observation::Voltages(_) => Stage::Voltages,
            Observation::Visibilities(_) => Stage::Visibilities,
        }
    }
}

/// Something that wants to see intermediate products. Time samples may be
/// processed in parallel, so observations can arrive from many threads and in
/// any time order, but the stages of a single time sample arrive in order.
pub trait VisObserver: Sync + Send {
    /// Is this observer interested in `stage`? Uninteresting stages aren't
    /// copied.
    fn wants(&self, _stage: Stage) -> bool {
        true
    }

    fn observe(&self, time_index: usize, observation: Observation);
}

/// A [`VisObserver`] that keeps everything it's given.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    records: Mutex<Vec<(usize, Observation)>>,
}

impl RecordingObserver {
    pub fn new() -> RecordingObserver {
        RecordingObserver::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Get all of the recorded observations, sorted by time index. Within a
    /// time index they are in [`Stage`] order.
    pub fn into_records(self) -> Vec<(usize, Observation)> {
        let mut records = self.records.into_inner();
        records.sort_by_key(|(time_index, obs)| (*time_index, obs.stage()));
        records
    }
}

impl VisObserver for RecordingObserver {
    fn observe(&self, time_index: usize, observation: Observation) {
        self.records.lock().push((time_index, observation));
    }
}
