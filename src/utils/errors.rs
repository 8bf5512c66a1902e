//! User-Friendly Error Formatting
//!
//! Turns probe failures into messages with troubleshooting hints.

use std::fmt::Write;

/// Format error for user consumption
///
/// Takes technical error and produces user-friendly message with
/// troubleshooting steps and context.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     HDR WSI ERROR                          ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    // Match against the whole context chain, not just the outermost message
    let error_msg = format!("{:#}", error);

    if error_msg.contains("WAYLAND_DISPLAY") || error_msg.contains("connect") {
        format_connection_error(&mut output);
    } else if error_msg.contains("parametric") {
        format_parametric_error(&mut output);
    } else if error_msg.contains("color management") || error_msg.contains("bindings") {
        format_protocol_error(&mut output);
    } else if error_msg.contains("config") {
        format_config_error(&mut output);
    } else {
        format_generic_error(&mut output);
    }

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{:#}", error).ok();
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Need Help?").ok();
    writeln!(
        &mut output,
        "  - Run with verbose logs: HDR_WSI_LOG=hdr_wsi_layer=trace hdr-wsi-probe -v"
    )
    .ok();
    writeln!(
        &mut output,
        "  - Attach the output of: hdr-wsi-probe -vv --log-format json"
    )
    .ok();

    output
}

fn format_connection_error(output: &mut String) {
    writeln!(output, "Wayland Connection Error").ok();
    writeln!(output).ok();
    writeln!(output, "Could not connect to a Wayland compositor.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Not running in a Wayland session").ok();
    writeln!(
        output,
        "     → Check: echo $WAYLAND_DISPLAY (should not be empty)"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  2. Running under a different user or sandbox").ok();
    writeln!(
        output,
        "     → Check that $XDG_RUNTIME_DIR/$WAYLAND_DISPLAY is accessible"
    )
    .ok();
}

fn format_protocol_error(output: &mut String) {
    writeln!(output, "No Usable Color Management Protocol").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "The compositor does not offer a color-management protocol this layer can bind."
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "Supported Protocols (by priority):").ok();
    writeln!(output, "  - frog_color_management_factory_v1").ok();
    writeln!(output, "  - wp_color_manager_v1").ok();
    writeln!(output, "  - xx_color_manager_v4").ok();
    writeln!(output).ok();
    writeln!(output, "Suggestions:").ok();
    writeln!(
        output,
        "  → List globals: wayland-info | grep color"
    )
    .ok();
    writeln!(
        output,
        "  → Some compositors gate HDR behind a setting (e.g. KWin display settings)"
    )
    .ok();
}

fn format_parametric_error(output: &mut String) {
    writeln!(output, "Parametric Image Descriptions Unsupported").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "The color manager is present but cannot build parametric descriptions."
    )
    .ok();
    writeln!(output).ok();
    writeln!(
        output,
        "  → Update the compositor; parametric support is required for HDR10 and scRGB"
    )
    .ok();
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "The HDR layer configuration is invalid.").ok();
    writeln!(output).ok();
    writeln!(output, "Suggestions:").ok();
    writeln!(output, "  → Check the file named by $HDR_WSI_CONFIG").ok();
    writeln!(
        output,
        "  → Valid log levels: trace, debug, info, warn, error"
    )
    .ok();
    writeln!(output, "  → Valid log formats: pretty, compact, json").ok();
}

fn format_generic_error(output: &mut String) {
    writeln!(output, "Probe Failed").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "An unexpected error occurred while talking to the compositor."
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_hint() {
        let error = anyhow::anyhow!("WAYLAND_DISPLAY is not set");
        let output = format_user_error(&error);
        assert!(output.contains("Wayland Connection Error"));
        assert!(output.contains("WAYLAND_DISPLAY is not set"));
    }

    #[test]
    fn test_parametric_hint_uses_context_chain() {
        let error = anyhow::anyhow!("compositor is lacking support for parametric image descriptions")
            .context("Discovery failed");
        assert!(format_user_error(&error).contains("Parametric Image Descriptions Unsupported"));
    }

    #[test]
    fn test_generic_fallback() {
        let output = format_user_error(&anyhow::anyhow!("boom"));
        assert!(output.contains("Probe Failed"));
    }
}
