//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → command-line flags / UPSETTER_* env override fields
//!     → validation.rs (semantic checks)
//!     → UpsetterConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Durations are human-readable strings, parsed by duration.rs

pub mod duration;
pub mod loader;
pub mod schema;
pub mod validation;

pub use duration::{parse_duration, DurationError};
pub use loader::{load_config, ConfigError};
pub use schema::{
    GroupsConfig, LogFormat, ObservabilityConfig, PollingConfig, PushgatewayConfig, UpsetterConfig,
};
pub use validation::{validate_config, ValidationError};
