//! Layer entry points
//!
//! [`HdrWsiLayer`] implements the WSI functions the layer intercepts. Each
//! takes the next layer's dispatch and otherwise mirrors the Vulkan call.
//! Surfaces and swapchains the layer does not track are passed through
//! untouched.
//!
//! ```text
//! instance level                              device level
//! ──────────────                              ────────────
//! vkCreateWaylandSurfaceKHR   discovery       vkCreateSwapchainKHR   color binding
//! vkGetPhysicalDeviceSurface  augmentation    vkDestroySwapchainKHR  forget state
//!   Formats(2)KHR                             vkSetHdrMetadataEXT    buffer, mark dirty
//! vkDestroySurfaceKHR         teardown        vkQueuePresentKHR      commit dirty swapchains
//! vkEnumerateDevice           + VK_EXT_hdr_metadata
//!   ExtensionProperties
//! ```

use std::ffi::{c_char, CStr};
use std::sync::Arc;

use ash::prelude::VkResult;
use ash::vk;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::color::ColorDescription;
use crate::config::LayerConfig;
use crate::metadata::HdrMetadata;
use crate::protocol::{DisplayConnector, WaylandTarget};
use crate::registry::{Entry, SynchronizedMap};
use crate::surface::{self, ColorBinding, Discovery, FormatQuery, SurfaceState};
use crate::swapchain::{self, CommitOutcome, SwapchainColorState};

pub mod dispatch;
pub mod enumerate;
pub mod error;

pub use dispatch::{DeviceDispatch, InstanceDispatch};
pub use error::{LayerError, Result};

/// Name the layer is registered under
pub const LAYER_NAME: &CStr = c"VK_LAYER_hdr_wsi";

/// `VK_EXT_hdr_metadata`, implemented by the layer itself
pub fn hdr_metadata_extension() -> vk::ExtensionProperties {
    let mut properties = vk::ExtensionProperties {
        spec_version: ash::ext::hdr_metadata::SPEC_VERSION,
        ..Default::default()
    };
    for (dst, src) in properties
        .extension_name
        .iter_mut()
        .zip(ash::ext::hdr_metadata::NAME.to_bytes())
    {
        *dst = *src as c_char;
    }
    properties
}

/// Swapchain handles of a present request
#[allow(unsafe_code)]
fn present_swapchains<'a>(info: &'a vk::PresentInfoKHR<'_>) -> &'a [vk::SwapchainKHR] {
    if info.swapchain_count == 0 || info.p_swapchains.is_null() {
        return &[];
    }
    // SAFETY: valid usage of vkQueuePresentKHR requires `p_swapchains` to
    // point at `swapchain_count` handles for the duration of the call.
    unsafe { std::slice::from_raw_parts(info.p_swapchains, info.swapchain_count as usize) }
}

/// The application used a swapchain whose surface is already destroyed
fn abort_orphaned(swapchain: vk::SwapchainKHR, surface: vk::SurfaceKHR) -> ! {
    error!(
        ?swapchain,
        ?surface,
        "Surface for swapchain was already destroyed (application use after free)"
    );
    std::process::abort()
}

/// Layer state shared by every intercepted call
pub struct HdrWsiLayer {
    config: LayerConfig,
    connector: Arc<dyn DisplayConnector>,
    surfaces: SynchronizedMap<vk::SurfaceKHR, SurfaceState>,
    swapchains: SynchronizedMap<vk::SwapchainKHR, SwapchainColorState>,
    _log_guard: Option<WorkerGuard>,
}

impl HdrWsiLayer {
    /// Layer with an explicit configuration; logging is left to the caller
    pub fn new(config: LayerConfig, connector: Arc<dyn DisplayConnector>) -> Self {
        Self {
            config,
            connector,
            surfaces: SynchronizedMap::new(),
            swapchains: SynchronizedMap::new(),
            _log_guard: None,
        }
    }

    /// Layer configured from the environment, with logging installed
    pub fn from_env(connector: Arc<dyn DisplayConnector>) -> Self {
        let config = LayerConfig::from_env();
        let guard = crate::utils::init_logging(&config.logging).unwrap_or_else(|e| {
            eprintln!("hdr-wsi: logging setup failed: {e:#}");
            None
        });
        if !config.enabled {
            info!("HDR WSI layer disabled, passing everything through");
        }

        Self {
            _log_guard: guard,
            ..Self::new(config, connector)
        }
    }

    /// Active configuration
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// Whether `surface` has a bound color manager
    pub fn is_hdr_surface(&self, surface: vk::SurfaceKHR) -> bool {
        self.surfaces.contains(surface)
    }

    /// Binding of a tracked surface
    pub fn surface_binding(&self, surface: vk::SurfaceKHR) -> Option<ColorBinding> {
        self.surfaces
            .get(surface)
            .map(|entry| entry.lock().binding().clone())
    }

    /// Snapshot of a tracked swapchain's color state
    pub fn swapchain_state(&self, swapchain: vk::SwapchainKHR) -> Option<SwapchainColorState> {
        self.swapchains
            .get(swapchain)
            .map(|entry| entry.lock().clone())
    }

    /// `vkCreateWaylandSurfaceKHR`
    pub fn create_wayland_surface(
        &self,
        next: &dyn InstanceDispatch,
        instance: vk::Instance,
        info: &vk::WaylandSurfaceCreateInfoKHR<'_>,
    ) -> VkResult<vk::SurfaceKHR> {
        if !self.config.enabled {
            return next.create_wayland_surface(instance, info);
        }

        let mut queue = match self.connector.open_queue(&WaylandTarget::from_create_info(info)) {
            Ok(queue) => queue,
            Err(e) => {
                warn!(error = %e, "Could not open a protocol queue, HDR disabled for surface");
                return next.create_wayland_surface(instance, info);
            }
        };

        let surface = match next.create_wayland_surface(instance, info) {
            Ok(surface) => surface,
            Err(result) => {
                queue.destroy_queue();
                return Err(result);
            }
        };

        if let Discovery::Bound(state) = surface::discover(instance, queue) {
            self.surfaces.insert(surface, state);
        }
        Ok(surface)
    }

    /// `vkDestroySurfaceKHR`
    pub fn destroy_surface(
        &self,
        next: &dyn InstanceDispatch,
        instance: vk::Instance,
        surface: vk::SurfaceKHR,
    ) {
        if let Some(entry) = self.surfaces.remove(surface) {
            entry.lock().teardown();
        }
        next.destroy_surface(instance, surface);
    }

    fn extra_formats(
        &self,
        next: &dyn InstanceDispatch,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        entry: &Entry<SurfaceState>,
        query: FormatQuery,
    ) -> VkResult<Vec<&'static ColorDescription>> {
        let native = enumerate::enumerate(|count, out| {
            next.get_physical_device_surface_formats(physical_device, surface, count, out)
        })?;

        let mut state = entry.lock();
        state.set_supports_passthrough(surface::supports_passthrough(&native));

        let extras = surface::augment(state.binding(), &native, query);
        for desc in &extras {
            debug!(
                surface_id = state.surface_id(),
                format = ?desc.format,
                color_space = ?desc.color_space,
                "Enabling format"
            );
        }
        Ok(extras)
    }

    /// `vkGetPhysicalDeviceSurfaceFormatsKHR`
    pub fn get_physical_device_surface_formats(
        &self,
        next: &dyn InstanceDispatch,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        count: &mut u32,
        formats: Option<&mut [vk::SurfaceFormatKHR]>,
    ) -> vk::Result {
        let Some(entry) = self.surfaces.get(surface) else {
            return next.get_physical_device_surface_formats(physical_device, surface, count, formats);
        };

        let extras = match self.extra_formats(
            next,
            physical_device,
            surface,
            &entry,
            FormatQuery::Classic,
        ) {
            Ok(extras) => extras,
            Err(result) => return result,
        };
        let extras: Vec<vk::SurfaceFormatKHR> =
            extras.iter().map(|desc| desc.surface_format()).collect();

        enumerate::append(
            |count, out| next.get_physical_device_surface_formats(physical_device, surface, count, out),
            &extras,
            count,
            formats,
        )
    }

    /// `vkGetPhysicalDeviceSurfaceFormats2KHR`
    pub fn get_physical_device_surface_formats2(
        &self,
        next: &dyn InstanceDispatch,
        physical_device: vk::PhysicalDevice,
        info: &vk::PhysicalDeviceSurfaceInfo2KHR<'_>,
        count: &mut u32,
        formats: Option<&mut [vk::SurfaceFormat2KHR<'_>]>,
    ) -> vk::Result {
        let Some(entry) = self.surfaces.get(info.surface) else {
            return next.get_physical_device_surface_formats2(physical_device, info, count, formats);
        };

        let extras = match self.extra_formats(
            next,
            physical_device,
            info.surface,
            &entry,
            FormatQuery::Extended,
        ) {
            Ok(extras) => extras,
            Err(result) => return result,
        };

        enumerate::append_with(
            |count, out| next.get_physical_device_surface_formats2(physical_device, info, count, out),
            &extras,
            count,
            formats,
            |slot, desc| slot.surface_format = desc.surface_format(),
        )
    }

    /// `vkEnumerateDeviceExtensionProperties`
    pub fn enumerate_device_extension_properties(
        &self,
        next: &dyn InstanceDispatch,
        physical_device: vk::PhysicalDevice,
        layer_name: Option<&CStr>,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        let exposed = [hdr_metadata_extension()];

        match layer_name {
            Some(name) if name == LAYER_NAME => enumerate::array(&exposed, count, properties),
            Some(_) => next.enumerate_device_extension_properties(
                physical_device,
                layer_name,
                count,
                properties,
            ),
            None => enumerate::append(
                |count, out| {
                    next.enumerate_device_extension_properties(physical_device, None, count, out)
                },
                &exposed,
                count,
                properties,
            ),
        }
    }

    /// `vkCreateSwapchainKHR`
    pub fn create_swapchain(
        &self,
        next: &dyn DeviceDispatch,
        device: vk::Device,
        info: &vk::SwapchainCreateInfoKHR<'_>,
    ) -> VkResult<vk::SwapchainKHR> {
        let Some(entry) = self.surfaces.get(info.surface) else {
            return next.create_swapchain(device, info);
        };
        self.create_hdr_swapchain(next, device, info, &entry)
            .map_err(vk::Result::from)
    }

    fn create_hdr_swapchain(
        &self,
        next: &dyn DeviceDispatch,
        device: vk::Device,
        info: &vk::SwapchainCreateInfoKHR<'_>,
        entry: &Entry<SurfaceState>,
    ) -> Result<vk::SwapchainKHR> {
        let (variant, surface_id, driver_color_space) = {
            let state = entry.lock();
            (state.variant(), state.surface_id(), state.driver_color_space())
        };

        info!(
            surface_id,
            format = ?info.image_format,
            color_space = ?info.image_color_space,
            "Creating swapchain"
        );

        let native = enumerate::enumerate(|count, out| {
            next.instance().get_physical_device_surface_formats(
                next.physical_device(),
                info.surface,
                count,
                out,
            )
        })?;
        if !native.iter().any(|format| format.format == info.image_format) {
            warn!(
                surface_id,
                format = ?info.image_format,
                color_space = ?info.image_color_space,
                "Refusing to make swapchain (unsupported VkFormat)"
            );
            return Err(LayerError::UnsupportedFormat {
                format: info.image_format,
                surface_id,
            });
        }

        let mut driver_info = *info;
        driver_info.image_color_space = driver_color_space;
        let swapchain = next.create_swapchain(device, &driver_info)?;

        self.swapchains.insert(
            swapchain,
            SwapchainColorState::new(info.surface, variant, info.image_color_space),
        );
        Ok(swapchain)
    }

    /// `vkDestroySwapchainKHR`
    pub fn destroy_swapchain(
        &self,
        next: &dyn DeviceDispatch,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
    ) {
        self.swapchains.remove(swapchain);
        next.destroy_swapchain(device, swapchain);
    }

    /// `vkSetHdrMetadataEXT`
    ///
    /// Never forwarded: below the layer nobody implements the extension.
    /// Aborts the process if a swapchain outlived its surface.
    pub fn set_hdr_metadata(
        &self,
        swapchains: &[vk::SwapchainKHR],
        metadata: &[vk::HdrMetadataEXT<'_>],
    ) {
        for (index, (&swapchain, metadata)) in swapchains.iter().zip(metadata).enumerate() {
            let Some(entry) = self.swapchains.get(swapchain) else {
                warn!(index, ?swapchain, "Swapchain does not support HDR, ignoring metadata");
                continue;
            };

            let mut state = entry.lock();
            if !self.surfaces.contains(state.surface()) {
                abort_orphaned(swapchain, state.surface());
            }

            let metadata = HdrMetadata::from(metadata);
            info!(
                min_luminance = metadata.min_luminance,
                max_luminance = metadata.max_luminance,
                max_content_light_level = metadata.max_content_light_level,
                max_frame_average_light_level = metadata.max_frame_average_light_level,
                "HDR metadata set"
            );
            state.set_metadata(metadata);
        }
    }

    /// `vkQueuePresentKHR`
    ///
    /// Commits every dirty swapchain of the batch before presenting. A
    /// handshake can block here for as long as the compositor takes.
    pub fn queue_present(
        &self,
        next: &dyn DeviceDispatch,
        queue: vk::Queue,
        info: &vk::PresentInfoKHR<'_>,
    ) -> vk::Result {
        for &swapchain in present_swapchains(info) {
            let Some(entry) = self.swapchains.get(swapchain) else {
                continue;
            };

            let mut state = entry.lock();
            if !state.is_dirty() {
                continue;
            }

            let Some(surface) = self.surfaces.get(state.surface()) else {
                abort_orphaned(swapchain, state.surface());
            };
            let mut surface = surface.lock();

            let outcome = swapchain::commit(&mut state, &mut surface, self.config.scrgb.luminances());
            debug!(?swapchain, ?outcome, "Committed color state");
            if let CommitOutcome::Failed(reason) = outcome {
                debug!(?swapchain, %reason, "Retrying on next present");
            }
        }

        next.queue_present(queue, info)
    }
}

impl std::fmt::Debug for HdrWsiLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HdrWsiLayer")
            .field("config", &self.config)
            .field("surfaces", &self.surfaces.len())
            .field("swapchains", &self.swapchains.len())
            .finish_non_exhaustive()
    }
}
