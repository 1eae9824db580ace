pub mod asset;
pub mod distribution;
pub mod maven;
pub mod mojang;
pub mod progress;

// Re-export commonly used types
pub use asset::{Asset, ValidationResult};
pub use distribution::{
    Distribution, DistributionIndexProcessor, DistributionLoader, Module, ModuleType, Server,
};
pub use maven::Coordinate;
pub use mojang::VersionIndexProcessor;
pub use progress::{ProgressReporter, SilentProgressReporter};
