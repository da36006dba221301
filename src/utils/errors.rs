//! User-Friendly Error Formatting
//!
//! Provides user-friendly error messages with troubleshooting hints
//! for common error scenarios.

use std::fmt::Write;

/// Format error for user consumption
///
/// Takes a technical error and produces a user-friendly message with
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
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    let error_msg = error.to_string();

    if error_msg.contains("config") || error_msg.contains("section") {
        format_config_error(&mut output, &error_msg);
    } else if error_msg.contains("trace") {
        format_trace_error(&mut output, &error_msg);
    } else if error_msg.contains("display") || error_msg.contains("screen") {
        format_display_error(&mut output, &error_msg);
    } else {
        format_generic_error(&mut output, &error_msg);
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

    output
}

fn format_config_error(output: &mut String, msg: &str) {
    writeln!(output, "Configuration problem: {}", msg).ok();
    writeln!(output).ok();
    writeln!(output, "Troubleshooting:").ok();
    writeln!(output, "  1. Check the TOML syntax of your config file").ok();
    writeln!(
        output,
        "  2. Thresholds live in [0, 1] and switch_threshold >= stay_threshold"
    )
    .ok();
    writeln!(
        output,
        "  3. Run without --config to use the built-in defaults"
    )
    .ok();
}

fn format_trace_error(output: &mut String, msg: &str) {
    writeln!(output, "Trace problem: {}", msg).ok();
    writeln!(output).ok();
    writeln!(output, "Troubleshooting:").ok();
    writeln!(output, "  1. Traces are JSON lines, one record per line").ok();
    writeln!(
        output,
        "  2. The first record must declare the displays (\"kind\": \"displays\")"
    )
    .ok();
    writeln!(
        output,
        "  3. Timestamps must be non-decreasing milliseconds"
    )
    .ok();
}

fn format_display_error(output: &mut String, msg: &str) {
    writeln!(output, "Display topology problem: {}", msg).ok();
    writeln!(output).ok();
    writeln!(output, "Troubleshooting:").ok();
    writeln!(output, "  1. Display rectangles must not overlap").ok();
    writeln!(output, "  2. Width and height must be non-zero").ok();
    writeln!(
        output,
        "  3. The display count is capped by engine.max_screens"
    )
    .ok();
}

fn format_generic_error(output: &mut String, msg: &str) {
    writeln!(output, "Something went wrong: {}", msg).ok();
}
