// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Simulated visibilities for radio interferometers, formed from per-antenna
voltages.

The main entry point is [`vis_cpu`]; [`simulate`] and [`simulate_into`] do the
same thing with a compile-time float type.
 */

pub mod analytic;
pub mod beam;
mod constants;
pub mod coords;
pub mod direction;
mod types;
pub mod vis;

pub use beam::{
    BeamError, BeamInterpOptions, BeamKind, BeamModel, InterpolationOrder, ModelOptions,
    PixelBeamCube,
};
pub use constants::VEL_C;
pub use types::{PowerPol, Precision, VisFloat};
pub use vis::{
    simulate, simulate_into, vis_cpu, Observation, RecordingObserver, Stage, VisError,
    VisObserver, VisOptions, VisOutput, Visibilities,
};

// Re-exports.
pub use marlu::{c32, c64, AzEl};
