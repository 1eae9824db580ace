pub mod processor;
pub mod rules;
pub mod types;

pub use processor::{load_with_remote_fallback, ExpectedHash, VersionIndexProcessor};
pub use rules::{is_library_compatible, library_applies, native_classifier};
pub use types::{AssetIndex, AssetObject, Library, VersionJson, VersionManifest};
