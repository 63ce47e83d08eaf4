//! # Robocards
//!
//! A visual robot-programming editor in which behavior is assembled from
//! event→action card pairs (e.g. "tap detected" → "move forward"). The
//! ordered pair list is the program: row order is the order in which
//! event handlers are considered on the robot.
//!
//! ## Features
//! - Event and action palettes with click-to-append and drag-onto-row
//!   card placement
//! - A properties panel for per-card parameter slots
//! - An advanced mode unlocking memory-state filters on events
//! - Six selectable color schemes
//! - Persistence as an XML section of a multi-tool project file,
//!   preserving sibling sections written by other tools

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cards;
pub mod codec;
pub mod constants;
pub mod program;
pub mod robot;
mod ui;

pub use cards::{CardKind, CardRole, CardSpec};
pub use program::{Pair, PairId, Program};
use ui::RobocardsApp;

/// Runs the editor application with default settings.
///
/// This function initializes the egui application window and starts the
/// main event loop. UI-session state (color mode, window size) is
/// restored from eframe storage when available.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an
/// `eframe::Error` if initialization fails.
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Robocards",
        options,
        Box::new(|cc| {
            let app = cc
                .storage
                .and_then(|storage| storage.get_string("app_state"))
                .and_then(|json| RobocardsApp::from_json(&json).ok())
                .unwrap_or_default();
            Ok(Box::new(app))
        }),
    )
}
