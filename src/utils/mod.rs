pub mod constants;
pub mod filename;
pub mod progress;
pub mod prompt;
pub mod scratch;

pub use constants::*;
pub use filename::{shapefile_name, shapefile_path};
pub use progress::ProgressReporter;
pub use prompt::Prompter;
pub use scratch::ScratchSpace;
