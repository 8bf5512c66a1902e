//! hdr-wsi-probe - color-management probe for the HDR WSI layer
//!
//! Connects to the session compositor, runs the same discovery the layer runs
//! for every `VkSurfaceKHR`, and reports what an application would see.

use anyhow::{Context, Result};
use ash::vk::{self, Handle};
use clap::Parser;
use tracing::info;
use wayland_client::globals::{registry_queue_init, GlobalListContents};
use wayland_client::protocol::{wl_compositor, wl_registry, wl_surface};
use wayland_client::{Connection, Dispatch, QueueHandle};

use hdr_wsi_layer::config::{LayerConfig, LoggingConfig};
use hdr_wsi_layer::metadata::{Chromaticity, HdrMetadata};
use hdr_wsi_layer::protocol::wayland::WaylandColorQueue;
use hdr_wsi_layer::protocol::ProtocolVariant;
use hdr_wsi_layer::surface::{augment, discover, Discovery, FormatQuery, SurfaceState};
use hdr_wsi_layer::swapchain::{commit, SwapchainColorState};
use hdr_wsi_layer::utils::{format_user_error, init_logging};

/// Command-line arguments for hdr-wsi-probe
#[derive(Parser, Debug)]
#[command(name = "hdr-wsi-probe")]
#[command(version, about = "Probe Wayland color-management support for HDR swapchains", long_about = None)]
pub struct Args {
    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "compact")]
    pub log_format: String,

    /// Also commit an HDR10 description through the bound protocol
    #[arg(long)]
    pub commit_test: bool,
}

#[derive(Debug, Default)]
struct ProbeState;

fn main() -> Result<()> {
    let args = Args::parse();

    let logging = LoggingConfig {
        level: match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
        .to_string(),
        format: args.log_format.clone(),
        log_dir: None,
    };
    let _log_guard = init_logging(&logging)?;

    info!("hdr-wsi-probe v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        eprintln!("{}", format_user_error(&e));
        return Err(e);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let connection =
        Connection::connect_to_env().context("Failed to connect to the Wayland compositor")?;
    let (globals, mut queue) = registry_queue_init::<ProbeState>(&connection)
        .context("Failed to initialize the Wayland registry")?;
    let qh = queue.handle();

    let advertised: Vec<ProtocolVariant> = globals.contents().with_list(|list| {
        list.iter()
            .filter_map(|global| ProtocolVariant::from_interface(&global.interface))
            .collect()
    });
    println!("Advertised color managers:");
    if advertised.is_empty() {
        println!("  (none)");
    }
    for variant in &advertised {
        println!("  {variant}");
    }

    let compositor: wl_compositor::WlCompositor = globals
        .bind(&qh, 1..=4, ())
        .context("Failed to bind wl_compositor")?;
    let surface = compositor.create_surface(&qh, ());
    queue
        .roundtrip(&mut ProbeState)
        .context("Wayland roundtrip failed")?;

    let color_queue = WaylandColorQueue::new(&connection, surface.clone());
    let mut state = match discover(vk::Instance::null(), Box::new(color_queue)) {
        Discovery::Bound(state) => state,
        Discovery::Inert(reason) => {
            surface.destroy();
            return Err(anyhow::Error::new(reason).context("No usable color management protocol"));
        }
    };

    report(&state);

    let result = if args.commit_test {
        commit_test(&mut state)
    } else {
        Ok(())
    };

    state.teardown();
    surface.destroy();
    result
}

fn report(state: &SurfaceState) {
    println!();
    println!("Bound: {} (wl_surface@{})", state.variant(), state.surface_id());

    if let Some(caps) = state.binding().capabilities() {
        let mut features: Vec<u32> = caps.features.iter().map(|f| f.raw()).collect();
        let mut primaries: Vec<u32> = caps.primaries.iter().map(|p| p.raw()).collect();
        let mut transfer: Vec<u32> = caps.transfer_functions.iter().map(|t| t.raw()).collect();
        let mut intents: Vec<u32> = caps.intents.iter().map(|i| i.raw()).collect();
        features.sort_unstable();
        primaries.sort_unstable();
        transfer.sort_unstable();
        intents.sort_unstable();

        println!("  features:           {features:?}");
        println!("  primaries:          {primaries:?}");
        println!("  transfer functions: {transfer:?}");
        println!("  render intents:     {intents:?}");
    }

    let native = typical_native();
    for (label, query) in [
        ("vkGetPhysicalDeviceSurfaceFormatsKHR", FormatQuery::Classic),
        ("vkGetPhysicalDeviceSurfaceFormats2KHR", FormatQuery::Extended),
    ] {
        println!();
        println!("{label} would add:");
        let extras = augment(state.binding(), &native, query);
        if extras.is_empty() {
            println!("  (nothing)");
        }
        for desc in extras {
            println!("  {:?} / {:?}", desc.format, desc.color_space);
        }
    }
}

fn commit_test(state: &mut SurfaceState) -> Result<()> {
    let config = LayerConfig::from_env();
    let mut swapchain = SwapchainColorState::new(
        vk::SurfaceKHR::null(),
        state.variant(),
        vk::ColorSpaceKHR::HDR10_ST2084_EXT,
    );
    swapchain.set_metadata(HdrMetadata {
        red: Chromaticity { x: 0.708, y: 0.292 },
        green: Chromaticity { x: 0.170, y: 0.797 },
        blue: Chromaticity { x: 0.131, y: 0.046 },
        white_point: Chromaticity {
            x: 0.3127,
            y: 0.3290,
        },
        max_luminance: 1000.0,
        min_luminance: 0.0005,
        max_content_light_level: 1000.0,
        max_frame_average_light_level: 400.0,
    });

    let outcome = commit(&mut swapchain, state, config.scrgb.luminances());
    println!();
    println!("HDR10 commit: {outcome:?}");

    if swapchain.is_dirty() {
        anyhow::bail!("HDR10 commit was not accepted by the compositor: {outcome:?}");
    }
    Ok(())
}

/// Formats a typical 10-bit capable driver reports for a Wayland surface
fn typical_native() -> Vec<vk::SurfaceFormatKHR> {
    [
        vk::Format::B8G8R8A8_UNORM,
        vk::Format::B8G8R8A8_SRGB,
        vk::Format::A2B10G10R10_UNORM_PACK32,
        vk::Format::A2R10G10B10_UNORM_PACK32,
        vk::Format::R16G16B16A16_SFLOAT,
    ]
    .into_iter()
    .map(|format| vk::SurfaceFormatKHR {
        format,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    })
    .collect()
}

impl Dispatch<wl_registry::WlRegistry, GlobalListContents> for ProbeState {
    fn event(
        _state: &mut Self,
        _proxy: &wl_registry::WlRegistry,
        _event: wl_registry::Event,
        _data: &GlobalListContents,
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        // Globals are read from GlobalListContents
    }
}

impl Dispatch<wl_compositor::WlCompositor, ()> for ProbeState {
    fn event(
        _state: &mut Self,
        _proxy: &wl_compositor::WlCompositor,
        _event: wl_compositor::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<wl_surface::WlSurface, ()> for ProbeState {
    fn event(
        _state: &mut Self,
        _proxy: &wl_surface::WlSurface,
        _event: wl_surface::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
    }
}
