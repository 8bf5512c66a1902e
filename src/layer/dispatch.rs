//! Next-layer dispatch
//!
//! The functions the layer calls further down the chain. The loader shim
//! fills these from `vkGetInstanceProcAddr` / `vkGetDeviceProcAddr`; tests
//! use fakes. List queries keep the two-call shape of the C API with the
//! output array as an optional slice.

use std::ffi::CStr;

use ash::prelude::VkResult;
use ash::vk;

/// Instance-level functions of the next layer
pub trait InstanceDispatch: Send + Sync {
    /// `vkCreateWaylandSurfaceKHR`
    fn create_wayland_surface(
        &self,
        instance: vk::Instance,
        info: &vk::WaylandSurfaceCreateInfoKHR<'_>,
    ) -> VkResult<vk::SurfaceKHR>;

    /// `vkDestroySurfaceKHR`
    fn destroy_surface(&self, instance: vk::Instance, surface: vk::SurfaceKHR);

    /// `vkGetPhysicalDeviceSurfaceFormatsKHR`
    fn get_physical_device_surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        count: &mut u32,
        formats: Option<&mut [vk::SurfaceFormatKHR]>,
    ) -> vk::Result;

    /// `vkGetPhysicalDeviceSurfaceFormats2KHR`
    fn get_physical_device_surface_formats2(
        &self,
        physical_device: vk::PhysicalDevice,
        info: &vk::PhysicalDeviceSurfaceInfo2KHR<'_>,
        count: &mut u32,
        formats: Option<&mut [vk::SurfaceFormat2KHR<'_>]>,
    ) -> vk::Result;

    /// `vkEnumerateDeviceExtensionProperties`
    fn enumerate_device_extension_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        layer_name: Option<&CStr>,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result;
}

/// Device-level functions of the next layer
pub trait DeviceDispatch: Send + Sync {
    /// Physical device the device was created from
    fn physical_device(&self) -> vk::PhysicalDevice;

    /// Instance dispatch of that physical device
    fn instance(&self) -> &dyn InstanceDispatch;

    /// `vkCreateSwapchainKHR`
    fn create_swapchain(
        &self,
        device: vk::Device,
        info: &vk::SwapchainCreateInfoKHR<'_>,
    ) -> VkResult<vk::SwapchainKHR>;

    /// `vkDestroySwapchainKHR`
    fn destroy_swapchain(&self, device: vk::Device, swapchain: vk::SwapchainKHR);

    /// `vkQueuePresentKHR`
    fn queue_present(&self, queue: vk::Queue, info: &vk::PresentInfoKHR<'_>) -> vk::Result;
}
