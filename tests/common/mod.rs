//! Shared fakes for the integration tests
//!
//! `FakeConnector` hands out `FakeQueue`s that play a scripted compositor and
//! record every request. `FakeInstance` and `FakeDevice` stand in for the
//! driver below the layer.

#![allow(dead_code)]

use std::ffi::{c_void, CStr};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use parking_lot::Mutex;

use hdr_wsi_layer::color::{Feature, Primaries, RenderIntent, TransferFunction};
use hdr_wsi_layer::layer::enumerate;
use hdr_wsi_layer::protocol::{
    DescriptionId, DisplayConnector, EventSink, FrogHdrMetadata, Global, ParametricDescription,
    ProtocolError, ProtocolEvent, ProtocolQueue, ProtocolVariant, Result, WaylandTarget,
};
use hdr_wsi_layer::{DeviceDispatch, InstanceDispatch};

/// Install a test subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A request the layer sent to the compositor
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    RequestGlobals,
    ReleaseRegistry,
    Bind(ProtocolVariant),
    CreateColorSurface,
    SetContainerColorVolume(Primaries),
    SetTransferFunction(TransferFunction),
    SetHdrMetadata(FrogHdrMetadata),
    Unset,
    CreateParametric(ParametricDescription),
    SetImageDescription(DescriptionId, RenderIntent),
    DestroyImageDescription(DescriptionId),
    DestroyColorSurface,
    DestroyManager,
    DestroyQueue,
}

/// How the compositor answers `create`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionBehavior {
    /// `ready` on the next roundtrip
    Ready,
    /// `failed` on the next roundtrip
    Failed,
    /// Nothing until [`CompositorLog::release`] is called
    NeverUntilReleased,
}

/// Scripted compositor
#[derive(Debug, Clone)]
pub struct Compositor {
    pub globals: Vec<Global>,
    pub features: Vec<Feature>,
    pub primaries: Vec<Primaries>,
    pub transfer_functions: Vec<TransferFunction>,
    pub intents: Vec<RenderIntent>,
    pub description: DescriptionBehavior,
}

impl Compositor {
    /// Compositor advertising `interfaces` with no capabilities
    pub fn advertising(interfaces: &[&str]) -> Self {
        let mut globals = vec![Global {
            name: 1,
            interface: "wl_compositor".to_string(),
            version: 6,
        }];
        globals.extend(interfaces.iter().enumerate().map(|(i, interface)| Global {
            name: 10 + i as u32,
            interface: interface.to_string(),
            version: 1,
        }));

        Self {
            globals,
            features: Vec::new(),
            primaries: Vec::new(),
            transfer_functions: Vec::new(),
            intents: Vec::new(),
            description: DescriptionBehavior::Ready,
        }
    }

    pub fn with_features(mut self, features: &[Feature]) -> Self {
        self.features.extend_from_slice(features);
        self
    }

    pub fn with_primaries(mut self, primaries: &[Primaries]) -> Self {
        self.primaries.extend_from_slice(primaries);
        self
    }

    pub fn with_transfer_functions(mut self, tfs: &[TransferFunction]) -> Self {
        self.transfer_functions.extend_from_slice(tfs);
        self
    }

    pub fn with_intents(mut self, intents: &[RenderIntent]) -> Self {
        self.intents.extend_from_slice(intents);
        self
    }

    pub fn with_description(mut self, behavior: DescriptionBehavior) -> Self {
        self.description = behavior;
        self
    }

    fn capability_events(&self) -> Vec<ProtocolEvent> {
        let mut events = Vec::new();
        events.extend(self.intents.iter().copied().map(ProtocolEvent::SupportedIntent));
        events.extend(self.features.iter().copied().map(ProtocolEvent::SupportedFeature));
        events.extend(
            self.transfer_functions
                .iter()
                .copied()
                .map(ProtocolEvent::SupportedTransferFunction),
        );
        events.extend(self.primaries.iter().copied().map(ProtocolEvent::SupportedPrimaries));
        events.push(ProtocolEvent::CapabilitiesDone);
        events
    }
}

/// Everything the fake compositor saw, shared with the test
#[derive(Debug, Default)]
pub struct CompositorLog {
    requests: Mutex<Vec<Request>>,
    roundtrips: AtomicUsize,
    released: AtomicBool,
}

impl CompositorLog {
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    /// Drain the request log
    pub fn take(&self) -> Vec<Request> {
        std::mem::take(&mut *self.requests.lock())
    }

    pub fn roundtrips(&self) -> usize {
        self.roundtrips.load(Ordering::SeqCst)
    }

    /// Let a held back description become ready
    pub fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }

    fn record(&self, request: Request) {
        self.requests.lock().push(request);
    }
}

/// Queue playing one [`Compositor`]
pub struct FakeQueue {
    surface_id: u32,
    compositor: Compositor,
    log: Arc<CompositorLog>,
    in_flight: Vec<ProtocolEvent>,
    held: Vec<DescriptionId>,
    next_description: u32,
}

impl FakeQueue {
    pub fn new(surface_id: u32, compositor: Compositor, log: Arc<CompositorLog>) -> Self {
        Self {
            surface_id,
            compositor,
            log,
            in_flight: Vec::new(),
            held: Vec::new(),
            next_description: 100,
        }
    }

    fn deliver(&mut self, sink: &mut dyn EventSink) -> usize {
        let events = std::mem::take(&mut self.in_flight);
        let count = events.len();
        for event in events {
            sink.handle(event);
        }
        count
    }
}

impl ProtocolQueue for FakeQueue {
    fn surface_id(&self) -> u32 {
        self.surface_id
    }

    fn request_globals(&mut self) -> Result<()> {
        self.log.record(Request::RequestGlobals);
        self.in_flight.extend(
            self.compositor
                .globals
                .iter()
                .cloned()
                .map(ProtocolEvent::Global),
        );
        Ok(())
    }

    fn release_registry(&mut self) {
        self.log.record(Request::ReleaseRegistry);
    }

    fn bind(&mut self, _global: &Global, variant: ProtocolVariant) -> Result<()> {
        self.log.record(Request::Bind(variant));
        if variant.uses_handshake() {
            let events = self.compositor.capability_events();
            self.in_flight.extend(events);
        }
        Ok(())
    }

    fn create_color_surface(&mut self) -> Result<()> {
        self.log.record(Request::CreateColorSurface);
        Ok(())
    }

    fn dispatch_pending(&mut self, _sink: &mut dyn EventSink) -> Result<usize> {
        // Nothing is read from the socket before a roundtrip
        Ok(0)
    }

    fn roundtrip(&mut self, sink: &mut dyn EventSink) -> Result<usize> {
        self.log.roundtrips.fetch_add(1, Ordering::SeqCst);

        if !self.held.is_empty() {
            if self.log.released.load(Ordering::SeqCst) {
                for id in std::mem::take(&mut self.held) {
                    self.in_flight.push(ProtocolEvent::DescriptionReady { id, identity: 7 });
                }
            } else {
                std::thread::sleep(Duration::from_millis(1));
            }
        }

        Ok(self.deliver(sink))
    }

    fn set_known_container_color_volume(&mut self, primaries: Primaries) -> Result<()> {
        self.log.record(Request::SetContainerColorVolume(primaries));
        Ok(())
    }

    fn set_known_transfer_function(&mut self, transfer_function: TransferFunction) -> Result<()> {
        self.log.record(Request::SetTransferFunction(transfer_function));
        Ok(())
    }

    fn set_hdr_metadata(&mut self, metadata: &FrogHdrMetadata) -> Result<()> {
        self.log.record(Request::SetHdrMetadata(*metadata));
        Ok(())
    }

    fn unset_image_description(&mut self) -> Result<()> {
        self.log.record(Request::Unset);
        Ok(())
    }

    fn create_parametric(&mut self, description: &ParametricDescription) -> Result<DescriptionId> {
        self.log.record(Request::CreateParametric(*description));
        let id = DescriptionId(self.next_description);
        self.next_description += 1;

        match self.compositor.description {
            DescriptionBehavior::Ready => self
                .in_flight
                .push(ProtocolEvent::DescriptionReady { id, identity: 7 }),
            DescriptionBehavior::Failed => self.in_flight.push(ProtocolEvent::DescriptionFailed {
                id,
                cause: 1,
                reason: "unsupported primaries".to_string(),
            }),
            DescriptionBehavior::NeverUntilReleased => self.held.push(id),
        }
        Ok(id)
    }

    fn set_image_description(&mut self, id: DescriptionId, intent: RenderIntent) -> Result<()> {
        self.log.record(Request::SetImageDescription(id, intent));
        Ok(())
    }

    fn destroy_image_description(&mut self, id: DescriptionId) {
        self.log.record(Request::DestroyImageDescription(id));
    }

    fn destroy_color_surface(&mut self) {
        self.log.record(Request::DestroyColorSurface);
    }

    fn destroy_manager(&mut self) {
        self.log.record(Request::DestroyManager);
    }

    fn destroy_queue(&mut self) {
        self.log.record(Request::DestroyQueue);
    }
}

/// Connector opening [`FakeQueue`]s on one scripted compositor
pub struct FakeConnector {
    compositor: Compositor,
    pub log: Arc<CompositorLog>,
    pub opened: AtomicUsize,
    pub fail: bool,
}

impl FakeConnector {
    pub fn new(compositor: Compositor) -> Self {
        Self {
            compositor,
            log: Arc::new(CompositorLog::default()),
            opened: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Compositor::advertising(&[]))
        }
    }
}

impl DisplayConnector for FakeConnector {
    fn open_queue(&self, target: &WaylandTarget) -> Result<Box<dyn ProtocolQueue>> {
        if self.fail {
            return Err(ProtocolError::Connection("display went away".to_string()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeQueue::new(
            target.surface as usize as u32,
            self.compositor.clone(),
            Arc::clone(&self.log),
        )))
    }
}

pub fn surface_format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
        format,
        color_space,
    }
}

/// What a typical desktop driver reports for a Wayland surface
pub fn typical_native() -> Vec<vk::SurfaceFormatKHR> {
    vec![
        surface_format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        surface_format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        surface_format(
            vk::Format::A2B10G10R10_UNORM_PACK32,
            vk::ColorSpaceKHR::SRGB_NONLINEAR,
        ),
        surface_format(
            vk::Format::A2R10G10B10_UNORM_PACK32,
            vk::ColorSpaceKHR::SRGB_NONLINEAR,
        ),
        surface_format(vk::Format::R16G16B16A16_SFLOAT, vk::ColorSpaceKHR::SRGB_NONLINEAR),
    ]
}

/// Driver below the layer, instance level
pub struct FakeInstance {
    pub native: Vec<vk::SurfaceFormatKHR>,
    pub extensions: Vec<vk::ExtensionProperties>,
    pub created: Mutex<Vec<vk::SurfaceKHR>>,
    pub destroyed: Mutex<Vec<vk::SurfaceKHR>>,
    pub fail_create: bool,
    next_surface: AtomicU64,
}

impl FakeInstance {
    pub fn new(native: Vec<vk::SurfaceFormatKHR>) -> Self {
        let swapchain = extension(ash::khr::swapchain::NAME);
        Self {
            native,
            extensions: vec![swapchain],
            created: Mutex::new(Vec::new()),
            destroyed: Mutex::new(Vec::new()),
            fail_create: false,
            next_surface: AtomicU64::new(0x1000),
        }
    }

    /// Classic query through the layer, collected with the two-call idiom
    pub fn query_formats(
        layer: &hdr_wsi_layer::HdrWsiLayer,
        next: &FakeInstance,
        surface: vk::SurfaceKHR,
    ) -> Vec<vk::SurfaceFormatKHR> {
        let mut count = 0;
        let result = layer.get_physical_device_surface_formats(
            next,
            vk::PhysicalDevice::null(),
            surface,
            &mut count,
            None,
        );
        assert_eq!(result, vk::Result::SUCCESS);

        let mut formats = vec![vk::SurfaceFormatKHR::default(); count as usize];
        let result = layer.get_physical_device_surface_formats(
            next,
            vk::PhysicalDevice::null(),
            surface,
            &mut count,
            Some(&mut formats),
        );
        assert_eq!(result, vk::Result::SUCCESS);
        formats.truncate(count as usize);
        formats
    }

    /// `Formats2` query through the layer
    pub fn query_formats2(
        layer: &hdr_wsi_layer::HdrWsiLayer,
        next: &FakeInstance,
        surface: vk::SurfaceKHR,
    ) -> Vec<vk::SurfaceFormatKHR> {
        let info = vk::PhysicalDeviceSurfaceInfo2KHR::default().surface(surface);
        let mut count = 0;
        let result = layer.get_physical_device_surface_formats2(
            next,
            vk::PhysicalDevice::null(),
            &info,
            &mut count,
            None,
        );
        assert_eq!(result, vk::Result::SUCCESS);

        let mut formats = vec![vk::SurfaceFormat2KHR::default(); count as usize];
        let result = layer.get_physical_device_surface_formats2(
            next,
            vk::PhysicalDevice::null(),
            &info,
            &mut count,
            Some(&mut formats),
        );
        assert_eq!(result, vk::Result::SUCCESS);
        formats
            .iter()
            .take(count as usize)
            .map(|format| format.surface_format)
            .collect()
    }
}

pub fn extension(name: &CStr) -> vk::ExtensionProperties {
    let mut properties = vk::ExtensionProperties {
        spec_version: 1,
        ..Default::default()
    };
    for (dst, src) in properties.extension_name.iter_mut().zip(name.to_bytes()) {
        *dst = *src as std::ffi::c_char;
    }
    properties
}

/// Create info for a fake `wl_surface` pointer
pub fn wayland_surface_info(surface: usize) -> vk::WaylandSurfaceCreateInfoKHR<'static> {
    vk::WaylandSurfaceCreateInfoKHR {
        display: 0x10 as *mut c_void,
        surface: surface as *mut c_void,
        ..Default::default()
    }
}

impl InstanceDispatch for FakeInstance {
    fn create_wayland_surface(
        &self,
        _instance: vk::Instance,
        _info: &vk::WaylandSurfaceCreateInfoKHR<'_>,
    ) -> VkResult<vk::SurfaceKHR> {
        if self.fail_create {
            return Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        }
        let surface = vk::SurfaceKHR::from_raw(self.next_surface.fetch_add(1, Ordering::SeqCst));
        self.created.lock().push(surface);
        Ok(surface)
    }

    fn destroy_surface(&self, _instance: vk::Instance, surface: vk::SurfaceKHR) {
        self.destroyed.lock().push(surface);
    }

    fn get_physical_device_surface_formats(
        &self,
        _physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
        count: &mut u32,
        formats: Option<&mut [vk::SurfaceFormatKHR]>,
    ) -> vk::Result {
        enumerate::array(&self.native, count, formats)
    }

    fn get_physical_device_surface_formats2(
        &self,
        _physical_device: vk::PhysicalDevice,
        _info: &vk::PhysicalDeviceSurfaceInfo2KHR<'_>,
        count: &mut u32,
        formats: Option<&mut [vk::SurfaceFormat2KHR<'_>]>,
    ) -> vk::Result {
        let Some(formats) = formats else {
            *count = self.native.len() as u32;
            return vk::Result::SUCCESS;
        };

        let written = formats.len().min(*count as usize).min(self.native.len());
        for (slot, native) in formats.iter_mut().zip(&self.native).take(written) {
            slot.surface_format = *native;
        }
        *count = written as u32;
        if written < self.native.len() {
            vk::Result::INCOMPLETE
        } else {
            vk::Result::SUCCESS
        }
    }

    fn enumerate_device_extension_properties(
        &self,
        _physical_device: vk::PhysicalDevice,
        layer_name: Option<&CStr>,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        match layer_name {
            None => enumerate::array(&self.extensions, count, properties),
            Some(_) => vk::Result::ERROR_LAYER_NOT_PRESENT,
        }
    }
}

/// Swapchain as the driver was asked to create it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSwapchain {
    pub handle: vk::SwapchainKHR,
    pub surface: vk::SurfaceKHR,
    pub format: vk::Format,
    pub color_space: vk::ColorSpaceKHR,
}

/// Driver below the layer, device level
pub struct FakeDevice {
    pub instance: FakeInstance,
    pub swapchains: Mutex<Vec<DriverSwapchain>>,
    pub destroyed: Mutex<Vec<vk::SwapchainKHR>>,
    pub presents: AtomicUsize,
    next_swapchain: AtomicU64,
}

impl FakeDevice {
    pub fn new(instance: FakeInstance) -> Self {
        Self {
            instance,
            swapchains: Mutex::new(Vec::new()),
            destroyed: Mutex::new(Vec::new()),
            presents: AtomicUsize::new(0),
            next_swapchain: AtomicU64::new(0x2000),
        }
    }

    pub fn last_swapchain(&self) -> Option<DriverSwapchain> {
        self.swapchains.lock().last().copied()
    }
}

impl DeviceDispatch for FakeDevice {
    fn physical_device(&self) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(0x30)
    }

    fn instance(&self) -> &dyn InstanceDispatch {
        &self.instance
    }

    fn create_swapchain(
        &self,
        _device: vk::Device,
        info: &vk::SwapchainCreateInfoKHR<'_>,
    ) -> VkResult<vk::SwapchainKHR> {
        let handle = vk::SwapchainKHR::from_raw(self.next_swapchain.fetch_add(1, Ordering::SeqCst));
        self.swapchains.lock().push(DriverSwapchain {
            handle,
            surface: info.surface,
            format: info.image_format,
            color_space: info.image_color_space,
        });
        Ok(handle)
    }

    fn destroy_swapchain(&self, _device: vk::Device, swapchain: vk::SwapchainKHR) {
        self.destroyed.lock().push(swapchain);
    }

    fn queue_present(&self, _queue: vk::Queue, _info: &vk::PresentInfoKHR<'_>) -> vk::Result {
        self.presents.fetch_add(1, Ordering::SeqCst);
        vk::Result::SUCCESS
    }
}

/// Swapchain create info on `surface`
pub fn swapchain_info(
    surface: vk::SurfaceKHR,
    format: vk::Format,
    color_space: vk::ColorSpaceKHR,
) -> vk::SwapchainCreateInfoKHR<'static> {
    vk::SwapchainCreateInfoKHR::default()
        .surface(surface)
        .min_image_count(3)
        .image_format(format)
        .image_color_space(color_space)
        .image_extent(vk::Extent2D {
            width: 1920,
            height: 1080,
        })
        .image_array_layers(1)
        .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
        .present_mode(vk::PresentModeKHR::FIFO)
}

/// Present one image of `swapchain` through the layer
pub fn present(
    layer: &hdr_wsi_layer::HdrWsiLayer,
    device: &FakeDevice,
    swapchain: vk::SwapchainKHR,
) -> vk::Result {
    let swapchains = [swapchain];
    let indices = [0];
    let info = vk::PresentInfoKHR::default()
        .swapchains(&swapchains)
        .image_indices(&indices);
    layer.queue_present(device, vk::Queue::null(), &info)
}

/// BT.2020 mastering display, 1000 nit peak
pub fn hdr10_metadata() -> vk::HdrMetadataEXT<'static> {
    vk::HdrMetadataEXT::default()
        .display_primary_red(vk::XYColorEXT { x: 0.708, y: 0.292 })
        .display_primary_green(vk::XYColorEXT { x: 0.170, y: 0.797 })
        .display_primary_blue(vk::XYColorEXT { x: 0.131, y: 0.046 })
        .white_point(vk::XYColorEXT {
            x: 0.3127,
            y: 0.3290,
        })
        .max_luminance(1000.0)
        .min_luminance(0.0005)
        .max_content_light_level(1000.0)
        .max_frame_average_light_level(400.6)
}
