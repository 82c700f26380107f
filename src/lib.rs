//! # `pano`
//!
//! Finds where, and facing which way, an equirectangular panorama was taken
//! inside a colored point cloud.
//!
//! This crate gathers the workspace crates in one place. All of the basic
//! types are included in the root of the crate. Modules group the stages of a
//! search.
//!
//! ## Modules
//! * [`sphere`] - equirectangular projection of directions
//! * [`partition`] - adaptive octree partitioning of the cloud
//! * [`render`] - panorama synthesis, resampling and patch histograms
//! * [`search`] - pose candidates and the strategies that trim them
//!
//! ## Example
//!
//! ```no_run
//! use pano::{search::*, render::Panorama, PointCloud};
//!
//! # fn run(cloud: PointCloud, image: Panorama) -> pano::Result<()> {
//! let translations = TranslationConfig::new(TranslationMode::Quantile { budget: 200 })?
//!     .candidates(&cloud)?;
//! let rotations = RotationConfig::yaw_only(24)?.candidates();
//! let settings = SearchSettings::default();
//! let best = histogram_pose_search(&image, &cloud, &translations, &rotations, &settings, None)?;
//! println!("{:?}", best[0].pose);
//! # Ok(())
//! # }
//! ```

pub use pano_core::*;

/// Adaptive octree partitioning
pub mod partition {
    pub use pano_octree::*;
}

/// Panorama synthesis and comparison
pub mod render {
    pub use pano_render::*;
}

/// Pose candidates and pose search
pub mod search {
    pub use pano_search::*;
}

/// Image opening
#[cfg(feature = "image")]
pub mod image {
    pub use image::*;

    use crate::render::Panorama;
    use std::path::Path;

    /// Opens an image file as a float panorama.
    pub fn open_panorama(path: impl AsRef<Path>) -> ImageResult<Panorama> {
        Ok(Panorama::from_dynamic(&open(path)?))
    }
}
