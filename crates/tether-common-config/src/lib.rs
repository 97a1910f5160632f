//! Configuration for Tether.
//!
//! Three layers, applied in order:
//!
//! 1. `tether.yaml` (or the file named by `TETHER_CONFIG_PATH`), with
//!    `${VAR}` / `${VAR:-default}` expansion.
//! 2. `TETHER_*` / `DATABASE_URL` environment overrides.
//! 3. The runtime mode flag (`TETHER_ENV`), read once and passed explicitly.

pub mod env;
pub mod loader;
pub mod mode;
pub mod types;

pub use env::*;
pub use loader::*;
pub use mode::RuntimeMode;
pub use types::*;
