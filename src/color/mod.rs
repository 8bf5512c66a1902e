//! Color descriptions
//!
//! Static knowledge shared by discovery, format augmentation and the commit
//! path: the wire tokens of each color-management protocol and the table of
//! (format, color space) pairs the layer can describe.
//!
//! ```text
//! VkSurfaceFormatKHR ──lookup──> ColorDescription ──tokens(variant)──> TokenPair
//!                                                                      ├─ Primaries
//!                                                                      └─ TransferFunction
//! ```

pub mod table;
pub mod tokens;

pub use table::{find_by_color_space, lookup, ColorDescription, TokenPair, COLOR_DESCRIPTIONS};
pub use tokens::{Feature, Primaries, RenderIntent, TransferFunction};
