pub mod loader;
pub mod model;
pub mod processor;
pub mod types;

pub use loader::DistributionLoader;
pub use model::{Distribution, Module, ModuleArtifact, ModuleIter, Required, Server, DEFAULT_SERVER_PORT};
pub use processor::DistributionIndexProcessor;
pub use types::{ModuleType, RawArtifact, RawDistribution, RawModule, RawRequired, RawServer};
