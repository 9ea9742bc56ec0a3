//! Splitting a provider reply into labelled sections.

use getset::Getters;
use strum::Display;
use tracing::{debug, warn};

use crate::prompt::SectionMarkers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Section {
    Title,
    Body,
    Tags,
}

/// A parsed reply. Lives for one display cycle and is replaced by the next generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct GenerationResult {
    title: String,
    body: String,
    tags: String,
    /// The reply exactly as received
    raw: String,
    #[getset(skip)]
    fallback: bool,
    #[getset(skip)]
    error: bool,
}

impl GenerationResult {
    /// No section marker was found, so the whole reply was placed in the body.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// The reply is a dispatcher error rather than generated text.
    pub fn is_error(&self) -> bool {
        self.error
    }

    pub fn section(&self, section: Section) -> &str {
        match section {
            Section::Title => &self.title,
            Section::Body => &self.body,
            Section::Tags => &self.tags,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut String {
        match section {
            Section::Title => &mut self.title,
            Section::Body => &mut self.body,
            Section::Tags => &mut self.tags,
        }
    }

    /// Wrap a dispatcher error so it can be shown in place of a reply.
    pub(crate) fn from_error(raw: String) -> Self {
        Self {
            body: raw.clone(),
            raw,
            error: true,
            ..Self::default()
        }
    }
}

/// Split `raw` on the default section markers.
pub fn parse(raw: &str) -> GenerationResult {
    parse_with(raw, &SectionMarkers::default())
}

/// Split `raw` on `markers`.
///
/// Each section runs from the end of the first occurrence of its marker to the nearest following
/// marker, or the end of the text, trimmed. Sections whose marker is missing stay empty. When no
/// marker is present at all the trimmed reply becomes the body and the result is flagged as a
/// fallback. Never fails.
pub fn parse_with(raw: &str, markers: &SectionMarkers) -> GenerationResult {
    let mut result = GenerationResult {
        raw: raw.to_string(),
        ..GenerationResult::default()
    };

    // (section, marker start, content start)
    let found: Vec<(Section, usize, usize)> = markers
        .ordered()
        .into_iter()
        .filter(|(_, marker)| !marker.is_empty())
        .filter_map(|(section, marker)| {
            raw.find(marker)
                .map(|pos| (section, pos, pos.saturating_add(marker.len())))
        })
        .collect();

    if found.is_empty() {
        warn!("Reply contains no section markers, showing it unparsed");
        result.body = raw.trim().to_string();
        result.fallback = true;
        return result;
    }

    for &(section, _, start) in &found {
        let end = found
            .iter()
            .map(|&(_, pos, _)| pos)
            .filter(|&pos| pos >= start)
            .min()
            .unwrap_or(raw.len());

        *result.section_mut(section) = raw.get(start..end).unwrap_or_default().trim().to_string();
    }

    debug!(sections = found.len(), "Parsed reply into sections");

    result
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{prompt::build_prompt, repository::Links};

    const WELL_FORMED: &str = "Sure! Here you go.
===SECTION_TITLE===
Launch Day Is Here

===SECTION_BODY===
We built something new. Watch now.
launch, video, product
#launch #video #product

===SECTION_TAGS===
launch, video, product
";

    #[test]
    fn test_all_sections() {
        let result = parse(WELL_FORMED);

        assert_eq!(result.title(), "Launch Day Is Here");
        assert_eq!(
            result.body(),
            "We built something new. Watch now.\nlaunch, video, product\n#launch #video #product"
        );
        assert_eq!(result.tags(), "launch, video, product");
        assert_eq!(result.raw(), WELL_FORMED);
        assert!(!result.is_fallback());
        assert!(!result.is_error());
    }

    #[test]
    fn test_reply_to_built_prompt() {
        // Every marker in the prompt is echoed back with content between them.
        let markers = SectionMarkers::default();
        let prompt = build_prompt("YouTube", "launch video", &Links::new());
        assert!(markers.ordered().iter().all(|(_, m)| prompt.contains(m)));

        let reply = markers
            .ordered()
            .iter()
            .map(|(section, marker)| format!("{marker}\n{section} text\n"))
            .collect::<String>();
        let result = parse_with(&reply, &markers);

        assert_eq!(result.title(), "Title text");
        assert_eq!(result.body(), "Body text");
        assert_eq!(result.tags(), "Tags text");
    }

    #[test]
    fn test_empty() {
        let result = parse("");

        assert_eq!(result, GenerationResult {
            fallback: true,
            ..GenerationResult::default()
        });
    }

    #[test]
    fn test_no_markers() {
        let result = parse("  Just some text\nwith no structure.  \n");

        assert!(result.is_fallback());
        assert_eq!(result.body(), "Just some text\nwith no structure.");
        assert!(result.title().is_empty());
        assert!(result.tags().is_empty());
    }

    #[test]
    fn test_title_and_body_only() {
        let result = parse("===SECTION_TITLE=== Hello ===SECTION_BODY=== World");

        assert_eq!(result.title(), "Hello");
        assert_eq!(result.body(), "World");
        assert_eq!(result.tags(), "");
        assert!(!result.is_fallback());
    }

    #[test]
    fn test_missing_body_marker() {
        let result = parse("===SECTION_TITLE===\nHello\n===SECTION_TAGS===\na, b");

        assert_eq!(result.title(), "Hello");
        assert_eq!(result.body(), "");
        assert_eq!(result.tags(), "a, b");
    }

    #[test]
    fn test_only_tags_marker_is_not_fallback() {
        let result = parse("preamble ===SECTION_TAGS=== a, b");

        assert!(!result.is_fallback());
        assert_eq!(result.tags(), "a, b");
        assert_eq!(result.body(), "");
    }

    #[test]
    fn test_out_of_order() {
        let result = parse("===SECTION_TAGS=== t ===SECTION_BODY=== b ===SECTION_TITLE=== h");

        assert_eq!(result.title(), "h");
        assert_eq!(result.body(), "b");
        assert_eq!(result.tags(), "t");
    }

    #[test]
    fn test_repeated_marker_uses_first() {
        let result = parse(
            "===SECTION_TITLE=== one ===SECTION_BODY=== body ===SECTION_TITLE=== two ===SECTION_TAGS=== x",
        );

        assert_eq!(result.title(), "one");
        assert_eq!(result.body(), "body ===SECTION_TITLE=== two");
        assert_eq!(result.tags(), "x");
    }

    #[test]
    fn test_marker_mid_line() {
        let result = parse("**===SECTION_TITLE===** Bold title\n===SECTION_BODY===text");

        assert_eq!(result.title(), "** Bold title");
        assert_eq!(result.body(), "text");
    }

    #[test]
    fn test_case_sensitive() {
        let result = parse("===section_title=== nope");

        assert!(result.is_fallback());
    }

    #[test]
    fn test_multibyte_text() {
        let result = parse("===SECTION_TITLE===🚀 Lançamento ===SECTION_BODY=== corpo ✨");

        assert_eq!(result.title(), "🚀 Lançamento");
        assert_eq!(result.section(Section::Body), "corpo ✨");
    }

    #[test]
    fn test_error_result() {
        let result = GenerationResult::from_error("Error: boom".into());

        assert!(result.is_error());
        assert!(!result.is_fallback());
        assert_eq!(result.body(), "Error: boom");
    }
}
