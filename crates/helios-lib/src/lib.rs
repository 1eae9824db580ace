//! Core of the Helios launcher: distribution manifest handling, Maven
//! coordinates and Mojang version index validation.

pub mod config;
pub mod error;
pub mod game;
pub mod net;
pub mod utils;

pub use config::CoreConfig;
pub use error::{CoreError, CoreResult, NetworkFailure};
pub use net::HttpClient;
