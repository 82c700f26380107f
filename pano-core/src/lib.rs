//! # Panorama pose search core
//!
//! This library provides the common types shared by the crates of the panoramic
//! pose search workspace. All of the other crates depend on it. It is kept small:
//! the colored [`PointCloud`], camera orientations as yaw/pitch/roll ([`Ypr`]),
//! the spherical projection that relates 3d directions to equirectangular image
//! coordinates ([`sphere`]), and [`SamplingGrid`]s that describe how a panorama
//! moves under a rotation.
//!
//! ## Equirectangular coordinates
//!
//! A panorama covers the whole sphere of directions around the camera. The
//! horizontal image axis is the azimuth and the vertical image axis is the polar
//! angle measured from `+z`. Positions on the image are expressed as normalized
//! coordinates in `[-1, 1] x [-1, 1]`:
//!
//! ```text
//!   (-1,-1) +---------------------------------+ (1,-1)     +z pole
//!           |                                 |
//!           |-x      +y       +x       -y     -x|            horizon
//!           |                                 |
//!   (-1, 1) +---------------------------------+ (1, 1)     -z pole
//! ```
//!
//! [`sphere::project`] and [`sphere::unproject`] convert between the two
//! representations and round-trip to float precision.

mod cloud;
mod error;
mod grid;
mod rotation;
pub mod sphere;

pub use cloud::*;
pub use error::*;
pub use grid::*;
pub use nalgebra;
pub use rotation::*;
