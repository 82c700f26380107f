//! Pose search of an equirectangular panorama inside a colored point cloud.
//!
//! A search draws translation hypotheses from the cloud with
//! [`TranslationConfig`] and rotation hypotheses with [`RotationConfig`], then
//! trims every combination of the two down to a short ranked list:
//!
//! * [`histogram_pose_search`] renders the cloud once per translation and
//!   scores every rotation by warping patch color histograms, which is fast
//!   enough for thousands of poses.
//! * [`sampling_loss_pose_search`] compares the color of every projected point
//!   with the image pixel it lands on.
//! * [`hybrid_pose_search`] trims with the sampling loss first, then renders
//!   the survivors in full for [`direct_histogram_pose_search`].
//!
//! [`score_map_2d`] and [`score_map_3d`] reuse the histogram scorer to find
//! which parts of the image, or of the cloud, no pose explains well.
//!
//! ```text
//!            translations x rotations
//!                       |
//!      +----------------+----------------+
//!      |                                 |
//!  histogram scorer               sampling loss
//!  (one render per                (one projection
//!   translation)                   per pose)
//!      |                                 |
//!   top N                        num_intermediate
//!                                        |
//!                                 direct histogram
//!                                        |
//!                                      top N
//! ```

mod cached;
pub mod candidates;
mod direct;
mod rank;
mod sampling;
mod score_cloud;
mod score_map;
mod scorer;
mod settings;
mod statistic;

pub use cached::*;
pub use candidates::*;
pub use direct::*;
pub use rank::{Pose, RankedPose};
pub use sampling::*;
pub use score_cloud::*;
pub use score_map::*;
pub use settings::*;
pub use statistic::*;
