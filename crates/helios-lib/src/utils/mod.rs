pub mod fs;
pub mod hash;
pub mod platform;

pub use hash::{calculate_file_hash, calculate_hash, validate_local_file, HashAlgo};
pub use platform::{Arch, OsType};
