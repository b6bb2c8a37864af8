pub mod aggregate;
pub mod output;
pub mod palette;
pub mod render;
pub mod stats;

pub use aggregate::{distribute, normalize, validate};
pub use output::{output_heatmap, output_json};
pub use palette::Palette;
pub use render::{intensity_level, render, render_all, BUCKET_COUNT};
pub use stats::{compute_stats, TOP_REPOSITORIES};
