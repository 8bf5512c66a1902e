//! Use-after-free detection
//!
//! Using a swapchain after its surface was destroyed aborts the process. Each
//! test re-runs itself in a child process and checks how the child died.

mod common;

use std::process::{Command, ExitStatus};
use std::sync::Arc;

use ash::vk;

use common::{
    hdr10_metadata, present, swapchain_info, typical_native, wayland_surface_info, Compositor,
    FakeConnector, FakeDevice, FakeInstance,
};
use hdr_wsi_layer::color::tokens::frog;
use hdr_wsi_layer::{HdrWsiLayer, LayerConfig};

const CHILD_ENV: &str = "HDR_WSI_FATAL_CHILD";

fn run_child(test: &str) -> ExitStatus {
    let exe = std::env::current_exe().expect("test binary path");
    Command::new(exe)
        .args(["--exact", test, "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .status()
        .expect("failed to spawn child test")
}

fn assert_aborted(status: ExitStatus) {
    assert!(!status.success(), "child should not exit cleanly");
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(status.signal(), Some(6), "child should die from SIGABRT");
    }
}

/// Layer with one frog surface and an HDR10 swapchain on it, surface destroyed
fn orphaned_swapchain() -> (HdrWsiLayer, FakeDevice, vk::SwapchainKHR) {
    common::init_tracing();
    let connector = Arc::new(FakeConnector::new(Compositor::advertising(&[
        frog::INTERFACE,
    ])));
    let layer = HdrWsiLayer::new(LayerConfig::default(), connector);
    let device = FakeDevice::new(FakeInstance::new(typical_native()));

    let surface = layer
        .create_wayland_surface(&device.instance, vk::Instance::null(), &wayland_surface_info(7))
        .expect("surface creation should succeed");
    let swapchain = layer
        .create_swapchain(
            &device,
            vk::Device::null(),
            &swapchain_info(
                surface,
                vk::Format::A2B10G10R10_UNORM_PACK32,
                vk::ColorSpaceKHR::HDR10_ST2084_EXT,
            ),
        )
        .expect("swapchain creation should succeed");

    layer.destroy_surface(&device.instance, vk::Instance::null(), surface);
    (layer, device, swapchain)
}

/// Test that metadata on an orphaned swapchain aborts
#[test]
fn test_orphaned_swapchain_metadata_aborts() {
    if std::env::var_os(CHILD_ENV).is_some() {
        let (layer, _device, swapchain) = orphaned_swapchain();
        layer.set_hdr_metadata(&[swapchain], &[hdr10_metadata()]);
        unreachable!("set_hdr_metadata should have aborted");
    }

    assert_aborted(run_child("test_orphaned_swapchain_metadata_aborts"));
}

/// Test that presenting an orphaned dirty swapchain aborts
#[test]
fn test_orphaned_swapchain_present_aborts() {
    if std::env::var_os(CHILD_ENV).is_some() {
        let (layer, device, swapchain) = orphaned_swapchain();
        let _ = present(&layer, &device, swapchain);
        unreachable!("queue_present should have aborted");
    }

    assert_aborted(run_child("test_orphaned_swapchain_present_aborts"));
}
