//! Application state management structures.
//!
//! This module contains all the state structures that track the
//! application's current UI state, including row selection, palette
//! drags, dialogs, and file operations.

use crate::cards::CardKind;
use crate::program::{PairId, Program};
use crate::robot::{ConsoleLink, RobotLink};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

/// State related to user interactions with rows and palettes.
///
/// Tracks selection and the palette drag in flight, if any.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionState {
    /// Currently selected pair row, if any
    #[serde(skip)]
    pub selected_pair: Option<PairId>,
    /// Palette card kind currently being dragged, if any
    #[serde(skip)]
    pub dragging_kind: Option<CardKind>,
    /// Row currently under the dragged palette card
    #[serde(skip)]
    pub drop_target: Option<PairId>,
    /// Canvas scale computed from the window size, shared with the
    /// palette panels so cards shrink together
    #[serde(skip)]
    pub canvas_scale: f32,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            selected_pair: None,
            dragging_kind: None,
            drop_target: None,
            canvas_scale: 1.0,
        }
    }
}

/// State of the modal dialogs layered over the editor.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct DialogState {
    /// Whether the unsaved-changes confirmation dialog is visible
    #[serde(skip)]
    pub show_unsaved_dialog: bool,
    /// The action the user attempted that requires confirmation
    #[serde(skip)]
    pub pending_confirm_action: Option<PendingConfirmAction>,
    /// Action to run once an in-flight save completes ("Save, then…")
    #[serde(skip)]
    pub after_save_action: Option<PendingConfirmAction>,
    /// Whether the simple-mode downgrade confirmation is visible
    #[serde(skip)]
    pub show_downgrade_dialog: bool,
    /// Load error text to present, if any
    #[serde(skip)]
    pub load_error: Option<String>,
    /// Whether the help window is visible
    #[serde(skip)]
    pub show_help: bool,
    /// One-shot flag to allow the next close request to proceed after
    /// user confirmation
    #[serde(skip)]
    pub allow_close_on_next_request: bool,
}

impl Default for DialogState {
    fn default() -> Self {
        Self {
            show_unsaved_dialog: false,
            pending_confirm_action: None,
            after_save_action: None,
            show_downgrade_dialog: false,
            load_error: None,
            show_help: false,
            allow_close_on_next_request: false,
        }
    }
}

/// State related to file operations and persistence.
///
/// Manages the current project path and the async file operations in
/// flight.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct FileState {
    /// Current project file path for save/load operations
    #[serde(skip)]
    pub current_path: Option<String>,
    /// Pending save operation, picked up once per frame
    #[serde(skip)]
    pub pending_save_operation: Option<PendingSaveOperation>,
    /// Pending load operation, picked up once per frame
    #[serde(skip)]
    pub pending_load_operation: Option<PendingLoadOperation>,
    /// Channel for receiving file operation results from async contexts
    #[serde(skip)]
    pub file_operation_sender: Option<Sender<FileOperationResult>>,
    /// Receiving end drained by the UI thread each frame
    #[serde(skip)]
    pub file_operation_receiver: Option<Receiver<FileOperationResult>>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            current_path: None,
            pending_save_operation: None,
            pending_load_operation: None,
            file_operation_sender: Some(sender),
            file_operation_receiver: Some(receiver),
        }
    }
}

/// Represents a pending save operation type.
#[derive(Debug)]
pub enum PendingSaveOperation {
    /// Save with a new file path (show file picker)
    SaveAs,
    /// Save to the existing file path
    Save,
}

/// Represents a pending load operation type.
#[derive(Debug)]
pub enum PendingLoadOperation {
    /// Load from a file (show file picker)
    Load,
}

/// Messages sent from async file operations back to the main app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// Save operation completed successfully with the given path
    SaveCompleted(String),
    /// The user dismissed the save dialog without picking a file
    SaveCancelled,
    /// Load operation completed successfully with path and content
    LoadCompleted(String, String),
    /// Operation failed with an error message
    OperationFailed(String),
}

/// Pending confirmation actions that may require user approval due to
/// unsaved changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingConfirmAction {
    /// User is attempting to start a new program
    New,
    /// User is attempting to open a project file
    Open,
    /// User is attempting to quit the application
    Quit,
}

/// The main application structure containing UI state and the program
/// being edited.
///
/// This struct implements the `eframe::App` trait and handles all user
/// interface rendering and interaction logic.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct RobocardsApp {
    /// The program being edited
    pub program: Program,
    /// User interaction state
    pub interaction: InteractionState,
    /// Dialog state
    pub dialogs: DialogState,
    /// File operations state
    pub file: FileState,
    /// Link to the robot host environment
    #[serde(skip, default = "default_robot_link")]
    pub robot: Box<dyn RobotLink>,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Persisted last known window inner size in logical points
    /// Stored as a simple tuple to avoid depending on serde for egui types
    pub window_inner_size: Option<(f32, f32)>,
    /// Whether we've already applied the stored window geometry this session
    #[serde(skip)]
    pub applied_viewport_restore: bool,
}

fn default_robot_link() -> Box<dyn RobotLink> {
    Box::new(ConsoleLink::new())
}

impl Default for RobocardsApp {
    fn default() -> Self {
        Self {
            program: Program::default(),
            interaction: InteractionState::default(),
            dialogs: DialogState::default(),
            file: FileState::default(),
            robot: Box::new(ConsoleLink::new()),
            dark_mode: true,
            window_inner_size: None,
            applied_viewport_restore: false,
        }
    }
}

impl RobocardsApp {
    /// Serializes the application state to JSON.
    ///
    /// # Returns
    ///
    /// A JSON string representation of the app state, or an error if
    /// serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes application state from JSON.
    ///
    /// # Arguments
    ///
    /// * `json` - JSON string containing the serialized app state
    ///
    /// # Returns
    ///
    /// A `RobocardsApp` instance, or an error if deserialization fails.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
