//! Layout snippet generation for repost preview cards.
//!
//! # Encoding pipeline
//!
//! The order below is fixed; the page renderer that consumes the snippet
//! decodes in exactly the reverse order.
//!
//! 1. Build the control data payload ([`ControlData`]).
//! 2. Serialize it to compact JSON.
//! 3. HTML-encode the JSON ([`html_encode`]).
//! 4. Replace `{` → `&#123;`, `}` → `&#125;`, `:` → `&#58;` in the encoded text.
//! 5. Substitute the result into the canvas wrapper markup.

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::RenderError;

/// Web part id of the repost card control; also used as its instance id.
pub const REPOST_CONTROL_ID: &str = "c1b5736d-84dd-4fdb-a7be-e7e9037bd3c3";

/// Data version tag the card control expects.
pub const DATA_VERSION: &str = "1.0";

const WRAPPER_NAME: &str = "repost/layout_wrapper.html";

const WRAPPER_TEMPLATE: &str = r#"<div><div data-sp-canvascontrol="" data-sp-canvasdataversion="" data-sp-controldata="{{ control_data }}"></div></div>"#;

/// Inputs of a preview card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutCard<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub url: &'a str,
    pub image_url: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ControlData<'a> {
    id: &'static str,
    instance_id: &'static str,
    server_processed_content: ServerProcessedContent,
    data_version: &'static str,
    properties: CardProperties<'a>,
}

/// Pre-rendered content blocks; always empty for repost cards.
#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct ServerProcessedContent {
    html_strings: Empty,
    searchable_plain_texts: Empty,
    image_sources: Empty,
    links: Empty,
}

#[derive(Serialize, Default)]
struct Empty {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CardProperties<'a> {
    description: &'a str,
    thumbnail_image_url: &'a str,
    title: &'a str,
    url: &'a str,
}

/// HTML attribute encoding with the character set pages written by earlier
/// tooling already use: `< > " ' &`, code points 160 to 255 and characters
/// outside the basic multilingual plane. `/` stays literal and `'` becomes
/// `&#39;`, so existing snippets compare equal.
pub fn html_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '&' => out.push_str("&amp;"),
            '\u{a0}'..='\u{ff}' | '\u{10000}'..='\u{10ffff}' => {
                out.push_str("&#");
                out.push_str(&u32::from(c).to_string());
                out.push(';');
            }
            _ => out.push(c),
        }
    }
    out
}

/// HTML-encode control data JSON and escape the characters the canvas parser
/// treats as structural.
pub fn encode_control_data(json: &str) -> String {
    html_encode(json)
        .replace('{', "&#123;")
        .replace('}', "&#125;")
        .replace(':', "&#58;")
}

/// Renders layout snippets. Holds the compiled wrapper template.
pub struct LayoutRenderer {
    tera: Tera,
}

impl LayoutRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        // The payload is escaped by `encode_control_data`; tera must not escape it again.
        tera.autoescape_on(vec![]);
        tera.add_raw_template(WRAPPER_NAME, WRAPPER_TEMPLATE)?;
        Ok(Self { tera })
    }

    /// Compact JSON of the control data payload for `card`.
    pub fn control_data_json(&self, card: &LayoutCard<'_>) -> Result<String, RenderError> {
        let payload = ControlData {
            id: REPOST_CONTROL_ID,
            instance_id: REPOST_CONTROL_ID,
            server_processed_content: ServerProcessedContent::default(),
            data_version: DATA_VERSION,
            properties: CardProperties {
                description: card.description,
                thumbnail_image_url: card.image_url,
                title: card.title,
                url: card.url,
            },
        };
        Ok(serde_json::to_string(&payload)?)
    }

    /// Render the full layout snippet for `card`. Deterministic for equal inputs.
    pub fn render(&self, card: &LayoutCard<'_>) -> Result<String, RenderError> {
        let json = self.control_data_json(card)?;
        let mut ctx = Context::new();
        ctx.insert("control_data", &encode_control_data(&json));
        Ok(self.tera.render(WRAPPER_NAME, &ctx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> LayoutCard<'static> {
        LayoutCard {
            title: "T",
            description: "D",
            url: "U",
            image_url: "I",
        }
    }

    #[test]
    fn control_data_field_order_is_stable() {
        let renderer = LayoutRenderer::new().unwrap();
        let json = renderer.control_data_json(&card()).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"id":"c1b5736d-84dd-4fdb-a7be-e7e9037bd3c3","#,
                r#""instanceId":"c1b5736d-84dd-4fdb-a7be-e7e9037bd3c3","#,
                r#""serverProcessedContent":{"htmlStrings":{},"searchablePlainTexts":{},"imageSources":{},"links":{}},"#,
                r#""dataVersion":"1.0","#,
                r#""properties":{"description":"D","thumbnailImageUrl":"I","title":"T","url":"U"}}"#
            )
        );
    }

    #[test]
    fn encoding_happens_after_html_escaping() {
        // A literal `&#123;` in the input must come out double-escaped as `&amp;#123;`.
        assert_eq!(encode_control_data("&#123;"), "&amp;#123;");
        assert_eq!(encode_control_data(r#"{"a":1}"#), "&#123;&quot;a&quot;&#58;1&#125;");
    }

    #[test]
    fn html_encoding_leaves_slashes_and_plain_text() {
        assert_eq!(html_encode("https://x/y"), "https://x/y");
        assert_eq!(html_encode("it's <b>"), "it&#39;s &lt;b&gt;");
        assert_eq!(html_encode("café"), "caf&#233;");
        assert_eq!(html_encode("naïve ü ß"), "na&#239;ve &#252; &#223;");
        assert_eq!(html_encode("Ω 中"), "Ω 中");
        assert_eq!(html_encode("😀"), "&#128512;");
    }

    #[test]
    fn url_in_payload_keeps_slashes() {
        assert_eq!(
            encode_control_data(r#"{"url":"https://x/y"}"#),
            "&#123;&quot;url&quot;&#58;&quot;https&#58;//x/y&quot;&#125;"
        );
    }
}
