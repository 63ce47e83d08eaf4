//! Card kinds and card instances for the visual program.
//!
//! Cards come in two roles: event cards describe a triggering condition
//! (a sensor or button) and action cards describe a robot behavior. The
//! set of kinds is closed; every kind has a fixed identifier used in the
//! save format, a fixed number of integer parameter slots, and a value
//! range used by the properties panel.

use serde::{Deserialize, Serialize};

/// Whether a card triggers behavior or performs it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardRole {
    /// The card describes a triggering condition.
    Event,
    /// The card describes a behavior to execute.
    Action,
}

/// The closed set of card kinds known to the editor.
///
/// Kind identifiers double as the `event-name`/`action-name` attribute
/// values in the save format, so they must never change once released.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardKind {
    /// Arrow-button press event (one slot per button).
    Button,
    /// Horizontal proximity sensor event (one slot per sensor).
    Prox,
    /// Ground proximity sensor event (one slot per sensor).
    ProxGround,
    /// Tap (accelerometer shock) event, no parameters.
    Tap,
    /// Clap (microphone peak) event, no parameters.
    Clap,
    /// Motor action (left and right target speed).
    Move,
    /// Top body light action (RGB).
    ColorTop,
    /// Bottom body light action (RGB).
    ColorBottom,
    /// Sound playback action (family and index).
    Sound,
    /// Memory-state setting action, available in advanced mode only.
    StateFilter,
}

/// Event kinds in palette order.
pub const EVENT_KINDS: [CardKind; 5] = [
    CardKind::Button,
    CardKind::Prox,
    CardKind::ProxGround,
    CardKind::Tap,
    CardKind::Clap,
];

/// Action kinds in palette order. The state-setting card comes last so
/// the palette can hide it outside advanced mode.
pub const ACTION_KINDS: [CardKind; 5] = [
    CardKind::Move,
    CardKind::ColorTop,
    CardKind::ColorBottom,
    CardKind::Sound,
    CardKind::StateFilter,
];

impl CardKind {
    /// Looks up a kind by its save-format identifier.
    ///
    /// # Arguments
    ///
    /// * `name` - The identifier as stored in `event-name`/`action-name`
    ///
    /// # Returns
    ///
    /// The matching kind, or `None` for an unknown identifier.
    pub fn from_name(name: &str) -> Option<CardKind> {
        match name {
            "button" => Some(CardKind::Button),
            "prox" => Some(CardKind::Prox),
            "proxground" => Some(CardKind::ProxGround),
            "tap" => Some(CardKind::Tap),
            "clap" => Some(CardKind::Clap),
            "move" => Some(CardKind::Move),
            "colortop" => Some(CardKind::ColorTop),
            "colorbottom" => Some(CardKind::ColorBottom),
            "sound" => Some(CardKind::Sound),
            "statefilter" => Some(CardKind::StateFilter),
            _ => None,
        }
    }

    /// The save-format identifier of this kind.
    pub fn name(self) -> &'static str {
        match self {
            CardKind::Button => "button",
            CardKind::Prox => "prox",
            CardKind::ProxGround => "proxground",
            CardKind::Tap => "tap",
            CardKind::Clap => "clap",
            CardKind::Move => "move",
            CardKind::ColorTop => "colortop",
            CardKind::ColorBottom => "colorbottom",
            CardKind::Sound => "sound",
            CardKind::StateFilter => "statefilter",
        }
    }

    /// Human-readable palette label.
    pub fn label(self) -> &'static str {
        match self {
            CardKind::Button => "Buttons",
            CardKind::Prox => "Proximity",
            CardKind::ProxGround => "Ground",
            CardKind::Tap => "Tap",
            CardKind::Clap => "Clap",
            CardKind::Move => "Move",
            CardKind::ColorTop => "Top color",
            CardKind::ColorBottom => "Bottom color",
            CardKind::Sound => "Sound",
            CardKind::StateFilter => "Set state",
        }
    }

    /// Whether this kind is an event or an action card.
    pub fn role(self) -> CardRole {
        match self {
            CardKind::Button
            | CardKind::Prox
            | CardKind::ProxGround
            | CardKind::Tap
            | CardKind::Clap => CardRole::Event,
            CardKind::Move
            | CardKind::ColorTop
            | CardKind::ColorBottom
            | CardKind::Sound
            | CardKind::StateFilter => CardRole::Action,
        }
    }

    /// Number of integer parameter slots this kind carries.
    ///
    /// The count is part of the save format: `eb0..ebN-1` / `ab0..abN-1`
    /// attributes are written and read for exactly this many slots.
    pub fn values_count(self) -> usize {
        match self {
            CardKind::Button => 5,
            CardKind::Prox => 7,
            CardKind::ProxGround => 2,
            CardKind::Tap => 0,
            CardKind::Clap => 0,
            CardKind::Move => 2,
            CardKind::ColorTop => 3,
            CardKind::ColorBottom => 3,
            CardKind::Sound => 2,
            CardKind::StateFilter => 4,
        }
    }

    /// Inclusive (min, max) range for this kind's parameter slots,
    /// used by the properties panel editors.
    pub fn value_range(self) -> (i32, i32) {
        match self {
            // 0 = ignored, 1 = must be pressed
            CardKind::Button => (0, 1),
            // 0 = ignored, 1 = object close, 2 = no object
            CardKind::Prox | CardKind::ProxGround => (0, 2),
            CardKind::Tap | CardKind::Clap => (0, 0),
            CardKind::Move => (-500, 500),
            CardKind::ColorTop | CardKind::ColorBottom => (0, 32),
            // family, then index within family
            CardKind::Sound => (0, 7),
            // 0 = leave, 1 = set, 2 = clear, per state quadrant
            CardKind::StateFilter => (0, 2),
        }
    }
}

/// A card instance: a kind plus concrete parameter values.
///
/// Event cards additionally carry a state filter, the memory-state
/// bucket the event is gated on. The filter is only meaningful while the
/// program is in advanced mode, but it is always stored so toggling the
/// mode does not lose data by itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardSpec {
    kind: CardKind,
    values: Vec<i32>,
    state_filter: i32,
}

impl CardSpec {
    /// Creates a card of the given kind with all slots zeroed.
    pub fn new(kind: CardKind) -> Self {
        Self {
            kind,
            values: vec![0; kind.values_count()],
            state_filter: 0,
        }
    }

    /// Creates a card from a save-format identifier.
    ///
    /// # Returns
    ///
    /// The new card, or `None` if the identifier names no known kind.
    pub fn from_name(name: &str) -> Option<Self> {
        CardKind::from_name(name).map(Self::new)
    }

    /// The kind of this card.
    pub fn kind(&self) -> CardKind {
        self.kind
    }

    /// The save-format identifier of this card's kind.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// This card's role (event or action).
    pub fn role(&self) -> CardRole {
        self.kind.role()
    }

    /// All parameter slots in order.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Reads one parameter slot. `slot` must be below `values_count`.
    pub fn value(&self, slot: usize) -> i32 {
        self.values[slot]
    }

    /// Writes one parameter slot. `slot` must be below `values_count`.
    pub fn set_value(&mut self, slot: usize, value: i32) {
        self.values[slot] = value;
    }

    /// The memory-state filter gating this event card.
    pub fn state_filter(&self) -> i32 {
        self.state_filter
    }

    /// Sets the memory-state filter.
    pub fn set_state_filter(&mut self, filter: i32) {
        self.state_filter = filter;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_round_trips_every_kind() {
        for kind in EVENT_KINDS.iter().chain(ACTION_KINDS.iter()) {
            assert_eq!(CardKind::from_name(kind.name()), Some(*kind));
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert_eq!(CardKind::from_name("doesNotExist"), None);
        assert!(CardSpec::from_name("doesNotExist").is_none());
        // Identifiers are case-sensitive
        assert_eq!(CardKind::from_name("Prox"), None);
    }

    #[test]
    fn test_new_card_has_fixed_arity() {
        let card = CardSpec::new(CardKind::Prox);
        assert_eq!(card.values().len(), 7);
        assert!(card.values().iter().all(|v| *v == 0));
        assert_eq!(card.state_filter(), 0);

        let card = CardSpec::new(CardKind::Tap);
        assert!(card.values().is_empty());
    }

    #[test]
    fn test_roles_split_the_palette() {
        for kind in EVENT_KINDS {
            assert_eq!(kind.role(), CardRole::Event);
        }
        for kind in ACTION_KINDS {
            assert_eq!(kind.role(), CardRole::Action);
        }
    }

    #[test]
    fn test_value_slots_read_back() {
        let mut card = CardSpec::new(CardKind::Move);
        card.set_value(0, 50);
        card.set_value(1, -50);
        assert_eq!(card.value(0), 50);
        assert_eq!(card.value(1), -50);
    }

    #[test]
    fn test_state_filter_is_stored() {
        let mut card = CardSpec::new(CardKind::Button);
        card.set_state_filter(3);
        assert_eq!(card.state_filter(), 3);
    }
}
