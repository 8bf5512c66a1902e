//! Layer error types

use ash::vk;
use thiserror::Error;

/// Result type for layer entry points
pub type Result<T> = std::result::Result<T, LayerError>;

/// Errors surfaced to the application through a `VkResult`
#[derive(Error, Debug)]
pub enum LayerError {
    /// The requested swapchain format is not natively supported by the surface
    #[error("Unsupported swapchain format {format:?} for surface {surface_id}")]
    UnsupportedFormat {
        /// Requested format
        format: vk::Format,
        /// `wl_surface` protocol id
        surface_id: u32,
    },

    /// The next layer or the driver failed
    #[error("Vulkan call failed: {0}")]
    Vulkan(#[from] vk::Result),
}

impl From<LayerError> for vk::Result {
    fn from(error: LayerError) -> Self {
        match error {
            LayerError::UnsupportedFormat { .. } => vk::Result::ERROR_INITIALIZATION_FAILED,
            LayerError::Vulkan(result) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_maps_to_initialization_failed() {
        let error = LayerError::UnsupportedFormat {
            format: vk::Format::R16G16B16A16_SFLOAT,
            surface_id: 3,
        };
        assert!(error.to_string().contains("surface 3"));
        assert_eq!(vk::Result::from(error), vk::Result::ERROR_INITIALIZATION_FAILED);
    }

    #[test]
    fn test_vulkan_error_passes_through() {
        let error = LayerError::from(vk::Result::ERROR_SURFACE_LOST_KHR);
        assert_eq!(vk::Result::from(error), vk::Result::ERROR_SURFACE_LOST_KHR);
    }
}
