//! User-Friendly Error Formatting
//!
//! Turns a top-level error into a message with troubleshooting hints.

use crate::error::{classify_error, ErrorType, ScrollError};
use std::fmt::Write;

/// Format error for user consumption
///
/// Takes the error that ended the program and produces a message with
/// troubleshooting steps and the full technical chain.
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

    match error_category(error) {
        ErrorType::Config => format_config_error(&mut output),
        ErrorType::Clock => format_clock_error(&mut output),
        ErrorType::Tap => format_tap_error(&mut output),
        ErrorType::Input => format_input_error(&mut output),
        ErrorType::Emission | ErrorType::Unknown => {
            format_generic_error(&mut output, &error.to_string())
        }
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
        "  - Run with --verbose for detailed logs: lamco-scroll -vv"
    )
    .ok();
    writeln!(
        &mut output,
        "  - Report issues: https://github.com/lamco-admin/lamco-scroll/issues"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();

    output
}

/// Category of an error chain: a typed engine error wins, then the message
fn error_category(error: &anyhow::Error) -> ErrorType {
    if let Some(scroll) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ScrollError>())
    {
        return classify_error(scroll);
    }

    let message = format!("{:#}", error).to_lowercase();
    if message.contains("config") {
        ErrorType::Config
    } else {
        ErrorType::Unknown
    }
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "Problem with the configuration file.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Invalid TOML syntax").ok();
    writeln!(output, "     → Check for typos, missing quotes, etc.").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Value out of range").ok();
    writeln!(output, "     → step, speed and precision must be positive").ok();
    writeln!(output, "     → duration must be between 1.0 and 5.0").ok();
    writeln!(output, "     → refresh_hz and interval_secs must be non-zero").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Unknown hotkey").ok();
    writeln!(
        output,
        "     → Use one of: control, option, command, shift, none"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  4. Duplicate [[exceptions]] entry").ok();
    writeln!(output, "     → Each application may appear only once").ok();
}

fn format_clock_error(output: &mut String) {
    writeln!(output, "Display Clock Error").ok();
    writeln!(output).ok();
    writeln!(output, "Could not create the display refresh clock.").ok();
    writeln!(output, "Scroll events will pass through unsmoothed.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. emission.refresh_hz is zero").ok();
    writeln!(output, "     → Set it to your display rate, e.g. 60").ok();
}

fn format_tap_error(output: &mut String) {
    writeln!(output, "Input Tap Error").ok();
    writeln!(output).ok();
    writeln!(output, "Could not attach to the system input stream.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Input monitoring permission not granted").ok();
    writeln!(output, "     → Grant the permission and start again").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Another smoothing tool owns the stream").ok();
    writeln!(output, "     → Quit it and start again").ok();
}

fn format_input_error(output: &mut String) {
    writeln!(output, "Input Event Error").ok();
    writeln!(output).ok();
    writeln!(output, "An input event could not be decoded.").ok();
    writeln!(output).ok();
    writeln!(output, "Each replay line must be one JSON object, e.g.:").ok();
    writeln!(
        output,
        "  {{\"type\":\"scroll\",\"y\":{{\"value\":-3.0}},\"pid\":412}}"
    )
    .ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "Scroll Engine Error").ok();
    writeln!(output).ok();
    writeln!(output, "An error occurred while running the engine.").ok();
    writeln!(output).ok();
    writeln!(output, "Error: {}", error).ok();
}
