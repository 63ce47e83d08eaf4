//! The visual program document model.
//!
//! A program is an ordered list of event/action pairs plus two document
//! settings (advanced mode and the color-scheme index). Order is
//! semantically significant: it is the vertical order shown to the user
//! and the order in which event handlers are considered on the robot.

use crate::cards::{CardKind, CardRole, CardSpec};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a pair row, stable across edits.
pub type PairId = Uuid;

/// One row of the program: an optional event card and an optional
/// action card. Both sides may be empty; a fully blank pair is the
/// editor's "add here" placeholder row and is preserved by the codec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pair {
    /// Unique identifier for this row
    pub id: PairId,
    /// The triggering condition, if placed
    pub event: Option<CardSpec>,
    /// The triggered behavior, if placed
    pub action: Option<CardSpec>,
}

impl Pair {
    /// Creates a fully blank pair.
    pub fn new_blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            event: None,
            action: None,
        }
    }

    /// True iff neither side holds a card.
    pub fn is_blank(&self) -> bool {
        self.event.is_none() && self.action.is_none()
    }
}

/// The persisted document: settings plus the ordered pair list.
///
/// An empty program (zero pairs) is the virgin state and must never be
/// serialized, so a file section shared with other tools is not
/// clobbered by an editor the user never touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    advanced: bool,
    color_scheme: usize,
    pairs: Vec<Pair>,
    #[serde(skip)]
    modified: bool,
}

impl Default for Program {
    /// Creates a new empty (virgin) program in simple mode.
    fn default() -> Self {
        Self {
            advanced: false,
            color_scheme: 0,
            pairs: Vec::new(),
            modified: false,
        }
    }
}

impl Program {
    /// Creates a new empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the pair sequence has zero elements.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All pairs in program order.
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Looks up a pair by id.
    pub fn pair(&self, id: PairId) -> Option<&Pair> {
        self.pairs.iter().find(|p| p.id == id)
    }

    /// Looks up a pair by id for mutation. Callers editing card values
    /// through this accessor must mark the program modified themselves.
    pub fn pair_mut(&mut self, id: PairId) -> Option<&mut Pair> {
        self.pairs.iter_mut().find(|p| p.id == id)
    }

    /// Appends a new pair whose event side is `card`.
    ///
    /// # Arguments
    ///
    /// * `card` - The event card to place; must have the event role
    ///
    /// # Returns
    ///
    /// The id of the new row, so the caller can focus the UI on it.
    pub fn add_event_card(&mut self, card: CardSpec) -> PairId {
        debug_assert_eq!(card.role(), CardRole::Event);
        let pair = Pair {
            id: Uuid::new_v4(),
            event: Some(card),
            action: None,
        };
        let id = pair.id;
        self.pairs.push(pair);
        self.modified = true;
        id
    }

    /// Appends a new pair whose action side is `card`.
    ///
    /// # Arguments
    ///
    /// * `card` - The action card to place; must have the action role
    ///
    /// # Returns
    ///
    /// The id of the new row, so the caller can focus the UI on it.
    pub fn add_action_card(&mut self, card: CardSpec) -> PairId {
        debug_assert_eq!(card.role(), CardRole::Action);
        let pair = Pair {
            id: Uuid::new_v4(),
            event: None,
            action: Some(card),
        };
        let id = pair.id;
        self.pairs.push(pair);
        self.modified = true;
        id
    }

    /// Appends a pair with the given sides, preserving blank rows
    /// exactly as given. The codec uses this to rebuild a loaded
    /// program row by row.
    ///
    /// # Returns
    ///
    /// The id of the new row.
    pub fn add_pair(&mut self, event: Option<CardSpec>, action: Option<CardSpec>) -> PairId {
        let pair = Pair {
            id: Uuid::new_v4(),
            event,
            action,
        };
        let id = pair.id;
        self.pairs.push(pair);
        self.modified = true;
        id
    }

    /// Places a card on an existing row, on the side matching its role,
    /// replacing whatever was there.
    ///
    /// # Returns
    ///
    /// `true` if the row exists and the card was placed.
    pub fn place_card(&mut self, id: PairId, card: CardSpec) -> bool {
        let role = card.role();
        match self.pair_mut(id) {
            Some(pair) => {
                match role {
                    CardRole::Event => pair.event = Some(card),
                    CardRole::Action => pair.action = Some(card),
                }
                self.modified = true;
                true
            }
            None => false,
        }
    }

    /// Removes a row entirely.
    ///
    /// # Returns
    ///
    /// `true` if the row existed and was removed.
    pub fn remove_pair(&mut self, id: PairId) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|p| p.id != id);
        let removed = self.pairs.len() != before;
        if removed {
            self.modified = true;
        }
        removed
    }

    /// Empties the pair sequence. Used before a load and on reset; does
    /// not touch the settings or the modified flag, the caller decides
    /// what those become.
    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Resets the program to the virgin state: no pairs, unmodified.
    pub fn reset(&mut self) {
        self.pairs.clear();
        self.modified = false;
    }

    /// Guarantees the sequence ends with at least one fully blank pair,
    /// so the editor always has an "add here" slot. Idempotent.
    pub fn ensure_trailing_blank_pair(&mut self) {
        if self.pairs.last().map_or(true, |p| !p.is_blank()) {
            self.pairs.push(Pair::new_blank());
        }
    }

    /// Whether advanced mode is active.
    pub fn advanced(&self) -> bool {
        self.advanced
    }

    /// Toggles advanced mode. Downgrading while state data is in use is
    /// conceptually destructive, but this only flips the flag; the
    /// caller is responsible for confirming with the user first (see
    /// [`Program::any_state_filter`]). Nothing is deleted here.
    pub fn set_advanced(&mut self, advanced: bool) {
        self.advanced = advanced;
    }

    /// True iff any event card carries a non-default state filter or
    /// any row holds a state-setting action card. Used by the caller to
    /// decide whether leaving advanced mode needs confirmation.
    pub fn any_state_filter(&self) -> bool {
        self.pairs.iter().any(|pair| {
            let filtered_event = pair
                .event
                .as_ref()
                .is_some_and(|c| c.state_filter() != 0);
            let state_action = pair
                .action
                .as_ref()
                .is_some_and(|c| c.kind() == CardKind::StateFilter);
            filtered_event || state_action
        })
    }

    /// The active color-scheme index.
    pub fn color_scheme(&self) -> usize {
        self.color_scheme
    }

    /// Selects a color scheme by palette index.
    pub fn set_color_scheme(&mut self, index: usize) {
        self.color_scheme = index;
    }

    /// Whether the document has changes since the last save checkpoint.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Sets the modified flag. The codec uses this as the save
    /// checkpoint; the UI uses it after in-place value edits.
    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }
}
