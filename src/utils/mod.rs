//! Utility Functions
//!
//! Logging setup and user-friendly error formatting.
//!
//! ## Logging
//!
//! ```rust,no_run
//! use hdr_wsi_layer::config::LoggingConfig;
//! use hdr_wsi_layer::utils::init_logging;
//!
//! // Keep the guard alive for as long as file logging is wanted
//! let _guard = init_logging(&LoggingConfig::default()).unwrap();
//! ```
//!
//! `HDR_WSI_LOG` takes a full filter directive and overrides the configured level:
//! ```bash
//! HDR_WSI_LOG=hdr_wsi_layer=trace vkcube --wsi wayland
//! ```
//!
//! ## Error Formatting
//!
//! [`format_user_error`] renders probe failures with context-specific hints:
//! - Connection errors → `WAYLAND_DISPLAY`, runtime dir access
//! - Protocol errors → supported globals, compositor settings
//! - Parametric errors → compositor version
//! - Config errors → valid levels and formats

pub mod errors;
pub mod logging;

pub use errors::format_user_error;
pub use logging::init_logging;
