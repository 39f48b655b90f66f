/// Which card layout the user asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpreadKind {
    /// One card read against the query directly.
    Single,
    /// Current situation plus potential outcome.
    TwoCard,
    /// Past, present, and future.
    ThreeCard,
}

impl SpreadKind {
    /// Number of cards drawn for this spread.
    pub fn card_count(&self) -> usize {
        match self {
            Self::Single => 1,
            Self::TwoCard => 2,
            Self::ThreeCard => 3,
        }
    }
}

/// One user submission, constructed once and owned by the relay for the
/// lifetime of the request.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GenerationRequest {
    /// Pre-rendered description of the drawn cards, e.g.
    /// `"The Moon (intuition), Justice (balance)"`.
    pub cards: String,
    /// Spread the cards were drawn for.
    #[serde(rename = "spreadType")]
    pub spread: SpreadKind,
    /// The question the user asked.
    pub query: String,
    /// Optional BCP 47 locale tag for the generated text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl GenerationRequest {
    /// Creates a request without a locale preference.
    pub fn new(
        cards: impl Into<String>,
        spread: SpreadKind,
        query: impl Into<String>,
    ) -> Self {
        Self {
            cards: cards.into(),
            spread,
            query: query.into(),
            locale: None,
        }
    }

    /// Sets the preferred response locale.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Role of a paragraph within a formatted reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParagraphTag {
    Intro,
    Body,
    Conclusion,
}

/// One normalized paragraph of a finished reading.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Paragraph {
    pub tag: ParagraphTag,
    pub text: String,
}

/// Immutable formatted reading derived once from the accumulated raw text.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FormattedReading {
    /// Paragraphs in display order.
    pub paragraphs: Vec<Paragraph>,
}

impl FormattedReading {
    /// Returns true when no paragraphs survived formatting.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Renders the reading as display text: intro and conclusion plain, body
    /// paragraphs bullet-marked, paragraphs separated by blank lines.
    pub fn to_text(&self) -> String {
        let mut rendered = Vec::with_capacity(self.paragraphs.len());
        for paragraph in &self.paragraphs {
            match paragraph.tag {
                ParagraphTag::Body => rendered.push(format!("\u{2022} {}", paragraph.text)),
                ParagraphTag::Intro | ParagraphTag::Conclusion => {
                    rendered.push(paragraph.text.clone());
                }
            }
        }
        rendered.join("\n\n")
    }
}

/// One card entry inside a validated summary.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CardSummary {
    /// Card title line, e.g. `"Past – The Moon"`.
    pub title: String,
    /// One to three sentences summarizing the card's reading.
    pub content: String,
}

/// Compact shareable summary of a finished reading.
///
/// Only returned after it parsed as valid JSON of this shape; see the
/// summarizer for the bounded repair behavior.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SummaryArtifact {
    /// Per-card summaries in spread order.
    pub cards: Vec<CardSummary>,
    /// Closing summary of the whole reading.
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_kind_serializes_to_wire_names() {
        assert_eq!(
            serde_json::to_string(&SpreadKind::ThreeCard).expect("serialize"),
            "\"three-card\""
        );
        let parsed: SpreadKind = serde_json::from_str("\"two-card\"").expect("parse");
        assert_eq!(parsed, SpreadKind::TwoCard);
    }

    #[test]
    fn reading_renders_bullets_only_for_body_paragraphs() {
        let reading = FormattedReading {
            paragraphs: vec![
                Paragraph {
                    tag: ParagraphTag::Intro,
                    text: "First.".into(),
                },
                Paragraph {
                    tag: ParagraphTag::Body,
                    text: "Second.".into(),
                },
                Paragraph {
                    tag: ParagraphTag::Conclusion,
                    text: "Third.".into(),
                },
            ],
        };
        assert_eq!(reading.to_text(), "First.\n\n\u{2022} Second.\n\nThird.");
    }

    #[test]
    fn summary_artifact_parses_expected_shape() {
        let json = r#"{"cards":[{"title":"Past – The Moon","content":"Clouded."}],"summary":"Trust."}"#;
        let artifact: SummaryArtifact = serde_json::from_str(json).expect("parse");
        assert_eq!(artifact.cards.len(), 1);
        assert_eq!(artifact.summary, "Trust.");
    }
}
