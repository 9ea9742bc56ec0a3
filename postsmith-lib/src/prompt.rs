//! Construction of the single-turn prompt sent to a provider.
//!
//! The prompt asks for a reply split by literal section markers; [`crate::sections`] splits the
//! reply on the same [`SectionMarkers`], so both sides must be built from one value.

use serde::{Deserialize, Serialize};

use crate::{repository::Links, sections::Section};

pub const DEFAULT_HASHTAG_COUNT: usize = 30;

/// Literal tokens the provider must echo to delimit each section of its reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionMarkers {
    pub title: String,
    pub body: String,
    pub tags: String,
}

impl Default for SectionMarkers {
    fn default() -> Self {
        Self {
            title: "===SECTION_TITLE===".into(),
            body: "===SECTION_BODY===".into(),
            tags: "===SECTION_TAGS===".into(),
        }
    }
}

impl SectionMarkers {
    /// Markers in the order the sections appear in a reply.
    pub fn ordered(&self) -> [(Section, &str); 3] {
        [
            (Section::Title, self.title.as_str()),
            (Section::Body, self.body.as_str()),
            (Section::Tags, self.tags.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder {
    markers: SectionMarkers,
    hashtag_count: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(SectionMarkers::default(), DEFAULT_HASHTAG_COUNT)
    }
}

impl PromptBuilder {
    pub fn new(markers: SectionMarkers, hashtag_count: usize) -> Self {
        Self {
            markers,
            hashtag_count,
        }
    }

    /// Build the prompt for a post on `target_network` about `description`.
    ///
    /// Total over its inputs: empty descriptions and link sets still produce a complete prompt.
    pub fn build(&self, target_network: &str, description: &str, links: &Links) -> String {
        let n = self.hashtag_count;
        let SectionMarkers { title, body, tags } = &self.markers;

        format!(
            "Act as a Social Media SEO Expert.

Platform: {target_network}
Topic / Content Focus: {description}

Your Task:
Create a high-performing social post with an SEO score of 95+.

You MUST follow these rules:
1. Use the exact section labels shown below, each on its own line, with no extra decoration or headers around them.
2. Complete every section fully. Do NOT stop until all {n} hashtags are written.
3. If the text becomes long, shorten the content. NEVER reduce the hashtags or keywords: there must be exactly {n} of each.
4. In the body section follow the structure silently (no titles, no headings, no list syntax). Apply the structure naturally inside the writing.

My Links:
{links}

========================
{title}
(Write a compelling title: short, powerful, high click-through potential)

{body}
(Follow this structure without announcing it:
- Begin with an attention-grabbing hook sentence.
- Continue naturally into an in-depth body with value-based insight or steps.
- Insert \"My Links\" exactly where relevant in the flow.
- After the content, generate {n} SEO keywords (comma separated).
- Immediately after the keywords, generate {n} SEO hashtags.)

{tags}
(Provide a comma-separated list of tags for backend settings, e.g. tag1, tag2, tag3)
",
            links = links_block(links),
        )
    }
}

/// One `"<icon> <channel>: <url>"` line per channel with a link.
fn links_block(links: &Links) -> String {
    if !links.has_active() {
        return "(none)".to_string();
    }

    links
        .active()
        .map(|(channel, url)| format!("{} {channel}: {url}", channel.icon()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build a prompt with the default markers and hashtag count.
pub fn build_prompt(target_network: &str, description: &str, links: &Links) -> String {
    PromptBuilder::default().build(target_network, description, links)
}
