//! # hdr-wsi-layer
//!
//! Vulkan WSI layer that carries `VK_EXT_hdr_metadata` to Wayland compositors
//! through their color-management protocols.
//!
//! Vulkan has one vendor-neutral HDR metadata structure. Wayland has grown
//! three incompatible ways to describe a color volume, and compositors ship
//! any of them:
//! - `frog_color_management_factory_v1` - direct token requests
//! - `wp_color_manager_v1` - staging color-management-v1, parametric handshake
//! - `xx_color_manager_v4` - experimental predecessor of v1
//!
//! # Architecture
//!
//! ```text
//! hdr-wsi-layer
//!   ├─> layer      (intercepted WSI entry points, next-layer dispatch)
//!   ├─> surface    (capability discovery, format augmentation)
//!   ├─> swapchain  (color binding, metadata commit)
//!   ├─> protocol   (per-target queue boundary, handshake)
//!   ├─> color      (protocol tokens, known color descriptions)
//!   └─> registry   (handle-keyed state maps)
//! ```
//!
//! # Data Flow
//!
//! **Discovery:** vkCreateWaylandSurfaceKHR → dedicated queue → registry → bind manager → capabilities
//!
//! **Formats:** native list → color table ∩ capabilities → appended HDR formats
//!
//! **Present:** vkSetHdrMetadataEXT → dirty swapchain → vkQueuePresentKHR → image description → compositor

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Layer configuration
pub mod config;

/// Color descriptions and protocol tokens
pub mod color;

/// Intercepted Vulkan entry points
pub mod layer;

/// HDR metadata and fixed-point conversion
pub mod metadata;

/// Display protocol boundary
pub mod protocol;

/// Handle-keyed state registries
pub mod registry;

/// Display target discovery and format augmentation
pub mod surface;

/// Swapchain color binding and commit
pub mod swapchain;

/// Logging and error formatting
pub mod utils;

pub use config::LayerConfig;
pub use layer::{DeviceDispatch, HdrWsiLayer, InstanceDispatch, LAYER_NAME};
pub use protocol::{DisplayConnector, ProtocolQueue, ProtocolVariant};
