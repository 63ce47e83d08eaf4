//! XML codec for the program document.
//!
//! The persisted form is an XML fragment: a root element holding one
//! `settings` element followed by one `buttonset` element per pair, in
//! program order. The fragment lives as one section of a larger
//! multi-tool project file; [`extract_fragment`] and [`embed_in_project`]
//! move it in and out of that file without disturbing sibling sections.
//!
//! Attribute names and their meaning are a stable on-disk contract
//! shared with other tools, so they never change once released.

use crate::cards::CardSpec;
use crate::constants::COLOR_SCHEMES;
use crate::program::Program;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fmt;

/// Tag of the fragment root element, also the section name inside the
/// project file.
pub const FRAGMENT_TAG: &str = "robocards";

/// Tag of the project-file root element.
pub const PROJECT_TAG: &str = "project";

/// Errors surfaced while reading a saved program.
///
/// Unknown card identifiers are fatal to the decode but the pairs
/// applied before the failure stay in the document, so the user can see
/// how far the load got.
#[derive(Debug)]
pub enum DecodeError {
    /// An `event-name` attribute named no known event card kind.
    UnknownEventCard(String),
    /// An `action-name` attribute named no known action card kind.
    UnknownActionCard(String),
    /// The XML itself could not be parsed or written.
    Xml(quick_xml::Error),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownEventCard(name) => {
                write!(f, "error in program source: unknown event card \"{name}\"")
            }
            DecodeError::UnknownActionCard(name) => {
                write!(f, "error in program source: unknown action card \"{name}\"")
            }
            DecodeError::Xml(err) => write!(f, "malformed program XML: {err}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Xml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for DecodeError {
    fn from(err: quick_xml::Error) -> Self {
        DecodeError::Xml(err)
    }
}

/// Serializes the program to its XML fragment.
///
/// # Returns
///
/// `None` when the program is empty (the virgin state), so a project
/// file shared with other tools is never clobbered by an editor the
/// user never touched. Otherwise the fragment string.
///
/// On success the modified flag is cleared; this is the save
/// checkpoint.
pub fn encode(program: &mut Program) -> Option<String> {
    if program.is_empty() {
        return None;
    }
    match write_fragment(program) {
        Ok(xml) => {
            program.set_modified(false);
            Some(xml)
        }
        Err(err) => {
            eprintln!("Failed to serialize program: {err}");
            None
        }
    }
}

fn write_fragment(program: &Program) -> Result<String, quick_xml::Error> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Start(BytesStart::new(FRAGMENT_TAG)))?;

    let mut settings = BytesStart::new("settings");
    settings.push_attribute((
        "advanced-mode",
        if program.advanced() { "true" } else { "false" },
    ));
    settings.push_attribute(("color-scheme", program.color_scheme().to_string().as_str()));
    writer.write_event(Event::Empty(settings))?;

    for pair in program.pairs() {
        let mut elem = BytesStart::new("buttonset");
        if let Some(event) = &pair.event {
            elem.push_attribute(("event-name", event.name()));
            for (slot, value) in event.values().iter().enumerate() {
                elem.push_attribute((format!("eb{slot}").as_str(), value.to_string().as_str()));
            }
            elem.push_attribute(("state", event.state_filter().to_string().as_str()));
        }
        if let Some(action) = &pair.action {
            elem.push_attribute(("action-name", action.name()));
            for (slot, value) in action.values().iter().enumerate() {
                elem.push_attribute((format!("ab{slot}").as_str(), value.to_string().as_str()));
            }
        }
        writer.write_event(Event::Empty(elem))?;
    }

    writer.write_event(Event::End(BytesEnd::new(FRAGMENT_TAG)))?;
    Ok(writer_into_string(writer))
}

/// Rebuilds the program from an XML fragment.
///
/// The program is cleared first, then the root's children are applied
/// in document order. Tags other than `settings` and `buttonset` are
/// ignored so newer files still load. Numeric attributes that are
/// missing or fail to parse fall back to 0; unknown card names abort
/// the decode and leave the pairs applied so far in place.
///
/// # Arguments
///
/// * `xml` - The fragment, rooted at the tool's own element
/// * `from_file` - Whether the fragment came from disk; a loaded file
///   starts out unmodified, any other source marks the document dirty
pub fn decode_into(program: &mut Program, xml: &str, from_file: bool) -> Result<(), DecodeError> {
    program.clear();

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if depth == 0 {
                    depth = 1;
                } else {
                    apply_element(program, e)?;
                    // Children of known and unknown elements alike carry
                    // no meaning in this format.
                    reader.read_to_end_into(e.name(), &mut skip_buf)?;
                }
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 1 {
                    apply_element(program, e)?;
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Err(err) => return Err(DecodeError::Xml(err)),
            _ => {}
        }
        buf.clear();
    }

    program.ensure_trailing_blank_pair();
    program.set_modified(!from_file);
    Ok(())
}

fn apply_element(program: &mut Program, e: &BytesStart) -> Result<(), DecodeError> {
    match e.name().as_ref() {
        b"settings" => apply_settings(program, e),
        b"buttonset" => apply_buttonset(program, e),
        _ => Ok(()),
    }
}

fn apply_settings(program: &mut Program, e: &BytesStart) -> Result<(), DecodeError> {
    let mut advanced = false;
    let mut scheme = 0usize;

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        match attr.key.as_ref() {
            b"advanced-mode" => advanced = attr.value.as_ref() == b"true",
            b"color-scheme" => {
                scheme = String::from_utf8_lossy(&attr.value).parse().unwrap_or(0);
            }
            _ => {}
        }
    }

    if scheme >= COLOR_SCHEMES.len() {
        scheme = 0;
    }
    // A load never asks for confirmation, the file decides the mode.
    program.set_advanced(advanced);
    program.set_color_scheme(scheme);
    Ok(())
}

fn apply_buttonset(program: &mut Program, e: &BytesStart) -> Result<(), DecodeError> {
    let mut attrs: Vec<(String, String)> = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        attrs.push((
            String::from_utf8_lossy(attr.key.as_ref()).to_string(),
            String::from_utf8_lossy(&attr.value).to_string(),
        ));
    }
    let lookup = |key: &str| {
        attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    let event = match lookup("event-name") {
        Some(name) if !name.is_empty() => {
            let mut card = CardSpec::from_name(name)
                .ok_or_else(|| DecodeError::UnknownEventCard(name.to_string()))?;
            for slot in 0..card.kind().values_count() {
                let value = lookup(&format!("eb{slot}"))
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                card.set_value(slot, value);
            }
            let state = lookup("state").and_then(|v| v.parse().ok()).unwrap_or(0);
            card.set_state_filter(state);
            Some(card)
        }
        _ => None,
    };

    let action = match lookup("action-name") {
        Some(name) if !name.is_empty() => {
            let mut card = CardSpec::from_name(name)
                .ok_or_else(|| DecodeError::UnknownActionCard(name.to_string()))?;
            for slot in 0..card.kind().values_count() {
                let value = lookup(&format!("ab{slot}"))
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                card.set_value(slot, value);
            }
            Some(card)
        }
        _ => None,
    };

    // A buttonset with neither side is the editor's blank row and is
    // kept, so row positions survive a save/load cycle.
    program.add_pair(event, action);
    Ok(())
}

/// Pulls this tool's section out of a project file.
///
/// # Returns
///
/// `Ok(Some(fragment))` when the section exists, `Ok(None)` when the
/// project has no section for this tool (a file written before the
/// editor was ever used), an error when the project XML is malformed.
pub fn extract_fragment(project_xml: &str) -> Result<Option<String>, DecodeError> {
    let mut reader = Reader::from_str(project_xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                // Accept the fragment both as its own document root and
                // as a child of the project root.
                if depth <= 1 && e.name().as_ref() == FRAGMENT_TAG.as_bytes() {
                    return Ok(Some(copy_subtree(&mut reader, e)?));
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e)) => {
                if depth <= 1 && e.name().as_ref() == FRAGMENT_TAG.as_bytes() {
                    let mut writer = Writer::new(Vec::new());
                    writer.write_event(Event::Empty(e.to_owned()))?;
                    return Ok(Some(writer_into_string(writer)));
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => return Ok(None),
            Err(err) => return Err(DecodeError::Xml(err)),
            _ => {}
        }
        buf.clear();
    }
}

/// Writes the fragment into a project document.
///
/// When `existing` holds a parseable project file, its content is
/// preserved: the old section for this tool (if any) is replaced in
/// place and every sibling section is copied through untouched.
/// Otherwise a fresh project document is created around the fragment.
pub fn embed_in_project(existing: Option<&str>, fragment: &str) -> Result<String, DecodeError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    match existing {
        Some(project_xml) if !project_xml.trim().is_empty() => {
            let mut reader = Reader::from_str(project_xml);
            reader.trim_text(true);
            let mut buf = Vec::new();
            let mut skip_buf = Vec::new();
            let mut depth = 0usize;
            let mut replaced = false;

            loop {
                match reader.read_event_into(&mut buf) {
                    Ok(Event::Start(e)) => {
                        if depth == 1 && e.name().as_ref() == FRAGMENT_TAG.as_bytes() {
                            reader.read_to_end_into(e.name(), &mut skip_buf)?;
                            if !replaced {
                                copy_into(&mut writer, fragment)?;
                                replaced = true;
                            }
                        } else {
                            writer.write_event(Event::Start(e))?;
                            depth += 1;
                        }
                    }
                    Ok(Event::Empty(e)) => {
                        if depth == 1 && e.name().as_ref() == FRAGMENT_TAG.as_bytes() {
                            if !replaced {
                                copy_into(&mut writer, fragment)?;
                                replaced = true;
                            }
                        } else {
                            writer.write_event(Event::Empty(e))?;
                        }
                    }
                    Ok(Event::End(e)) => {
                        // Leaving the root with no section seen yet:
                        // append ours before closing.
                        if depth == 1 && !replaced {
                            copy_into(&mut writer, fragment)?;
                            replaced = true;
                        }
                        writer.write_event(Event::End(e))?;
                        depth = depth.saturating_sub(1);
                    }
                    Ok(Event::Eof) => break,
                    Ok(Event::Decl(_)) => {}
                    Ok(other) => writer.write_event(other)?,
                    Err(err) => return Err(DecodeError::Xml(err)),
                }
                buf.clear();
            }
        }
        _ => {
            writer.write_event(Event::Start(BytesStart::new(PROJECT_TAG)))?;
            copy_into(&mut writer, fragment)?;
            writer.write_event(Event::End(BytesEnd::new(PROJECT_TAG)))?;
        }
    }

    Ok(writer_into_string(writer))
}

/// Copies the element the reader is inside of, start tag included,
/// through its matching end tag.
fn copy_subtree(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<String, DecodeError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Start(start.to_owned()))?;

    let mut buf = Vec::new();
    let mut depth = 1usize;
    while depth > 0 {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(err) => return Err(DecodeError::Xml(err)),
        };
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => {
                return Err(DecodeError::Xml(quick_xml::Error::UnexpectedEof(
                    String::from_utf8_lossy(start.name().as_ref()).to_string(),
                )))
            }
            _ => {}
        }
        writer.write_event(event)?;
        buf.clear();
    }

    Ok(writer_into_string(writer))
}

/// Streams every content event of `xml` into `writer`.
fn copy_into(writer: &mut Writer<Vec<u8>>, xml: &str) -> Result<(), DecodeError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => return Ok(()),
            Ok(Event::Decl(_)) => {}
            Ok(event) => writer.write_event(event)?,
            Err(err) => return Err(DecodeError::Xml(err)),
        }
        buf.clear();
    }
}

fn writer_into_string(writer: Writer<Vec<u8>>) -> String {
    String::from_utf8_lossy(&writer.into_inner()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardKind, CardSpec};

    fn scenario_program() -> Program {
        let mut program = Program::new();
        program.set_color_scheme(1);
        let mut prox = CardSpec::new(CardKind::Prox);
        for slot in 0..7 {
            prox.set_value(slot, slot as i32);
        }
        let mut mv = CardSpec::new(CardKind::Move);
        mv.set_value(0, 50);
        mv.set_value(1, 50);
        let id = program.add_event_card(prox);
        program.place_card(id, mv);
        program
    }

    #[test]
    fn test_empty_program_encodes_to_nothing() {
        let mut program = Program::new();
        assert!(encode(&mut program).is_none());

        // Settings alone never justify a document
        program.set_advanced(true);
        program.set_color_scheme(3);
        assert!(encode(&mut program).is_none());
    }

    #[test]
    fn test_encode_concrete_scenario() {
        let mut program = scenario_program();
        let xml = encode(&mut program).expect("non-empty program must encode");

        assert!(xml.contains("<robocards"));
        assert!(xml.contains(r#"<settings advanced-mode="false" color-scheme="1"/>"#));
        assert!(xml.contains(
            r#"<buttonset event-name="prox" eb0="0" eb1="1" eb2="2" eb3="3" eb4="4" eb5="5" eb6="6" state="0" action-name="move" ab0="50" ab1="50"/>"#
        ));
        let settings_at = xml.find("<settings").unwrap();
        let buttonset_at = xml.find("<buttonset").unwrap();
        assert!(settings_at < buttonset_at);
    }

    #[test]
    fn test_encode_clears_modified_flag() {
        let mut program = scenario_program();
        assert!(program.is_modified());
        encode(&mut program).expect("non-empty program must encode");
        assert!(!program.is_modified());
    }

    #[test]
    fn test_round_trip_preserves_pairs_and_settings() {
        let mut program = scenario_program();
        program.set_advanced(true);
        program.add_pair(None, None);
        let xml = encode(&mut program).expect("non-empty program must encode");

        let mut loaded = Program::new();
        decode_into(&mut loaded, &xml, true).expect("own output must decode");

        assert!(loaded.advanced());
        assert_eq!(loaded.color_scheme(), 1);
        // Original two rows plus the guaranteed trailing blank; the
        // saved blank row doubles as that trailing blank.
        assert_eq!(loaded.pairs().len(), 2);
        let first = &loaded.pairs()[0];
        assert_eq!(first.event.as_ref().unwrap().kind(), CardKind::Prox);
        assert_eq!(first.event.as_ref().unwrap().values(), &[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(first.action.as_ref().unwrap().kind(), CardKind::Move);
        assert_eq!(first.action.as_ref().unwrap().values(), &[50, 50]);
        assert!(loaded.pairs()[1].is_blank());
        assert!(!loaded.is_modified());
    }

    #[test]
    fn test_decode_from_file_flag_controls_modified() {
        let mut program = scenario_program();
        let xml = encode(&mut program).expect("non-empty program must encode");

        let mut loaded = Program::new();
        decode_into(&mut loaded, &xml, false).expect("own output must decode");
        assert!(loaded.is_modified());
    }

    #[test]
    fn test_decode_settings_round_trip() {
        let xml = r#"<robocards><settings advanced-mode="true" color-scheme="3"/></robocards>"#;
        let mut program = Program::new();
        decode_into(&mut program, xml, true).expect("settings must decode");
        assert!(program.advanced());
        assert_eq!(program.color_scheme(), 3);
        // The trailing blank row is guaranteed after every load
        assert_eq!(program.pairs().len(), 1);
        assert!(program.pairs()[0].is_blank());
    }

    #[test]
    fn test_decode_defaults_malformed_numerics_to_zero() {
        let xml = r#"<robocards>
            <settings advanced-mode="false" color-scheme="banana"/>
            <buttonset event-name="prox" eb0="abc" eb3="" state="x"/>
        </robocards>"#;
        let mut program = Program::new();
        decode_into(&mut program, xml, true).expect("decode must tolerate bad numbers");

        assert_eq!(program.color_scheme(), 0);
        let card = program.pairs()[0].event.as_ref().unwrap();
        assert_eq!(card.values(), &[0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(card.state_filter(), 0);
    }

    #[test]
    fn test_decode_out_of_range_color_scheme_falls_back() {
        let xml = r#"<robocards><settings advanced-mode="false" color-scheme="99"/></robocards>"#;
        let mut program = Program::new();
        decode_into(&mut program, xml, true).expect("settings must decode");
        assert_eq!(program.color_scheme(), 0);
    }

    #[test]
    fn test_unknown_event_name_is_fatal_but_keeps_earlier_pairs() {
        let xml = r#"<robocards>
            <settings advanced-mode="false" color-scheme="0"/>
            <buttonset event-name="tap"/>
            <buttonset event-name="doesNotExist"/>
            <buttonset event-name="clap"/>
        </robocards>"#;
        let mut program = Program::new();
        let err = decode_into(&mut program, xml, true).unwrap_err();

        match err {
            DecodeError::UnknownEventCard(name) => assert_eq!(name, "doesNotExist"),
            other => panic!("wrong error: {other:?}"),
        }
        // The pair decoded before the failure stays visible
        assert_eq!(program.pairs().len(), 1);
        assert_eq!(
            program.pairs()[0].event.as_ref().unwrap().kind(),
            CardKind::Tap
        );
    }

    #[test]
    fn test_unknown_action_name_is_fatal() {
        let xml = r#"<robocards><buttonset action-name="fly"/></robocards>"#;
        let mut program = Program::new();
        match decode_into(&mut program, xml, true).unwrap_err() {
            DecodeError::UnknownActionCard(name) => assert_eq!(name, "fly"),
            other => panic!("wrong error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_buttonsets_are_preserved() {
        let xml = r#"<robocards>
            <settings advanced-mode="false" color-scheme="0"/>
            <buttonset/>
            <buttonset event-name="tap"/>
            <buttonset/>
        </robocards>"#;
        let mut program = Program::new();
        decode_into(&mut program, xml, true).expect("blank rows must decode");

        assert_eq!(program.pairs().len(), 3);
        assert!(program.pairs()[0].is_blank());
        assert!(!program.pairs()[1].is_blank());
        assert!(program.pairs()[2].is_blank());
    }

    #[test]
    fn test_decode_ignores_unrecognized_tags() {
        let xml = r#"<robocards>
            <settings advanced-mode="true" color-scheme="2"/>
            <future-extension someday="yes"><nested/></future-extension>
            <buttonset event-name="button"/>
        </robocards>"#;
        let mut program = Program::new();
        decode_into(&mut program, xml, true).expect("unknown tags are skipped");

        assert!(program.advanced());
        assert_eq!(program.pairs().len(), 2);
        assert_eq!(
            program.pairs()[0].event.as_ref().unwrap().kind(),
            CardKind::Button
        );
    }

    #[test]
    fn test_decode_rejects_malformed_xml() {
        let mut program = Program::new();
        let err = decode_into(&mut program, "<robocards><settings", true).unwrap_err();
        assert!(matches!(err, DecodeError::Xml(_)));
    }

    #[test]
    fn test_extract_fragment_from_project() {
        let project = r#"<project>
            <othertool keep="me"><data/></othertool>
            <robocards>
                <settings advanced-mode="false" color-scheme="1"/>
                <buttonset event-name="clap" state="0"/>
            </robocards>
        </project>"#;
        let fragment = extract_fragment(project)
            .expect("project must parse")
            .expect("section must be found");

        assert!(fragment.starts_with("<robocards"));
        assert!(fragment.contains(r#"event-name="clap""#));
        assert!(!fragment.contains("othertool"));

        let mut program = Program::new();
        decode_into(&mut program, &fragment, true).expect("extracted fragment must decode");
        assert_eq!(program.color_scheme(), 1);
    }

    #[test]
    fn test_extract_fragment_missing_section() {
        let project = r#"<project><othertool/></project>"#;
        assert!(extract_fragment(project)
            .expect("project must parse")
            .is_none());
    }

    #[test]
    fn test_embed_creates_fresh_project() {
        let mut program = scenario_program();
        let fragment = encode(&mut program).expect("non-empty program must encode");
        let project = embed_in_project(None, &fragment).expect("embed must succeed");

        assert!(project.starts_with("<project"));
        assert!(project.contains("<robocards"));
        assert!(project.trim_end().ends_with("</project>"));
    }

    #[test]
    fn test_embed_replaces_section_and_keeps_siblings() {
        let existing = r#"<project>
            <othertool keep="me"><data value="7"/></othertool>
            <robocards>
                <settings advanced-mode="true" color-scheme="5"/>
                <buttonset event-name="tap"/>
            </robocards>
            <anothertool/>
        </project>"#;
        let mut program = scenario_program();
        let fragment = encode(&mut program).expect("non-empty program must encode");
        let project = embed_in_project(Some(existing), &fragment).expect("embed must succeed");

        assert!(project.contains(r#"<othertool keep="me">"#));
        assert!(project.contains(r#"<data value="7"/>"#));
        assert!(project.contains("<anothertool/>"));
        // The old section is gone, the new one is in
        assert!(!project.contains(r#"color-scheme="5""#));
        assert!(project.contains(r#"color-scheme="1""#));
        assert!(project.contains(r#"event-name="prox""#));
        assert!(!project.contains(r#"event-name="tap""#));

        // And the result still extracts and decodes
        let fragment = extract_fragment(&project)
            .expect("result must parse")
            .expect("section must exist");
        let mut loaded = Program::new();
        decode_into(&mut loaded, &fragment, true).expect("embedded fragment must decode");
        assert_eq!(loaded.pairs()[0].event.as_ref().unwrap().kind(), CardKind::Prox);
    }

    #[test]
    fn test_embed_appends_section_when_absent() {
        let existing = r#"<project><othertool/></project>"#;
        let mut program = scenario_program();
        let fragment = encode(&mut program).expect("non-empty program must encode");
        let project = embed_in_project(Some(existing), &fragment).expect("embed must succeed");

        assert!(project.contains("<othertool/>"));
        assert!(project.contains("<robocards"));
    }
}
