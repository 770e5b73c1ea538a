// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpers to build the coordinate inputs of the visibility kernel: Cartesian
//! equatorial unit vectors for point sources and equatorial-to-topocentric
//! rotation matrices.

use ndarray::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoordsError {
    #[error("Got {num_ra} right ascensions but {num_dec} declinations")]
    RaDecLengthMismatch { num_ra: usize, num_dec: usize },
}

/// Get the Cartesian equatorial unit vectors of point sources given their
/// right ascensions and declinations \[radians\]. The result has shape
/// `(3, num_sources)`.
pub fn point_source_crd_eq(ra_rad: &[f64], dec_rad: &[f64]) -> Result<Array2<f64>, CoordsError> {
    if ra_rad.len() != dec_rad.len() {
        return Err(CoordsError::RaDecLengthMismatch {
            num_ra: ra_rad.len(),
            num_dec: dec_rad.len(),
        });
    }
    let mut crd_eq = Array2::zeros((3, ra_rad.len()));
    crd_eq
        .axis_iter_mut(Axis(1))
        .zip(ra_rad.iter().zip(dec_rad.iter()))
        .for_each(|(mut crd, (&ra, &dec))| {
            let (s_ra, c_ra) = ra.sin_cos();
            let (s_dec, c_dec) = dec.sin_cos();
            crd[0] = c_ra * c_dec;
            crd[1] = c_dec * s_ra;
            crd[2] = s_dec;
        });
    Ok(crd_eq)
}

/// Get the 3x3 matrix rotating Cartesian equatorial coordinates into
/// topocentric (east, north, up) coordinates for an hour angle and declination
/// \[radians\].
pub fn eq2top_m(ha_rad: f64, dec_rad: f64) -> Array2<f64> {
    let (s_h, c_h) = ha_rad.sin_cos();
    let (s_d, c_d) = dec_rad.sin_cos();
    array![
        [s_h, c_h, 0.0],
        [-s_d * c_h, s_d * s_h, c_d],
        [c_d * c_h, -c_d * s_h, s_d],
    ]
}

/// Get an equatorial-to-topocentric rotation matrix for each local sidereal
/// time \[radians\], for an array at the given latitude \[radians\]. The result
/// has shape `(num_lsts, 3, 3)`.
pub fn get_eq2tops(lsts_rad: &[f64], latitude_rad: f64) -> Array3<f64> {
    let mut eq2tops = Array3::zeros((lsts_rad.len(), 3, 3));
    eq2tops
        .outer_iter_mut()
        .zip(lsts_rad.iter())
        .for_each(|(mut eq2top, &lst)| {
            eq2top.assign(&eq2top_m(-lst, latitude_rad));
        });
    eq2tops
}
