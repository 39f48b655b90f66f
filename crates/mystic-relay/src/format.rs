use crate::reading::{FormattedReading, Paragraph, ParagraphTag};

/// Formats accumulated raw reading text into tagged paragraphs.
///
/// Pure and deterministic: splits on newline runs, collapses internal
/// whitespace, capitalizes each paragraph's first letter, and drops empties.
/// The first surviving paragraph is the intro, the last the conclusion
/// (a lone paragraph serves as both and is tagged intro), everything between
/// is body. Zero surviving paragraphs yield an empty reading, not an error.
pub fn format_reading(raw: &str) -> FormattedReading {
    let normalized: Vec<String> = raw
        .split('\n')
        .map(normalize_paragraph)
        .filter(|p| !p.is_empty())
        .collect();

    let last = normalized.len().saturating_sub(1);
    let paragraphs = normalized
        .into_iter()
        .enumerate()
        .map(|(i, text)| Paragraph {
            tag: if i == 0 {
                ParagraphTag::Intro
            } else if i == last {
                ParagraphTag::Conclusion
            } else {
                ParagraphTag::Body
            },
            text,
        })
        .collect();

    FormattedReading { paragraphs }
}

fn normalize_paragraph(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(reading: &FormattedReading) -> Vec<ParagraphTag> {
        reading.paragraphs.iter().map(|p| p.tag).collect()
    }

    #[test]
    fn three_paragraphs_are_tagged_intro_body_conclusion() {
        let reading = format_reading("first.\n\nsecond.\n\nthird.");
        assert_eq!(
            tags(&reading),
            vec![
                ParagraphTag::Intro,
                ParagraphTag::Body,
                ParagraphTag::Conclusion
            ]
        );
        assert_eq!(
            reading.to_text(),
            "First.\n\n\u{2022} Second.\n\nThird."
        );
    }

    #[test]
    fn two_paragraphs_have_no_body() {
        let reading = format_reading("a.\n\nb.");
        assert_eq!(tags(&reading), vec![ParagraphTag::Intro, ParagraphTag::Conclusion]);
        assert_eq!(reading.to_text(), "A.\n\nB.");
    }

    #[test]
    fn single_paragraph_stands_alone() {
        let reading = format_reading("only one.");
        assert_eq!(tags(&reading), vec![ParagraphTag::Intro]);
    }

    #[test]
    fn whitespace_is_collapsed_and_first_letter_capitalized() {
        let reading = format_reading("  the   moon\trises  \n\n  slowly  now ");
        assert_eq!(reading.paragraphs[0].text, "The moon rises");
        assert_eq!(reading.paragraphs[1].text, "Slowly now");
    }

    #[test]
    fn empty_and_blank_input_yield_an_empty_reading() {
        assert!(format_reading("").is_empty());
        assert!(format_reading("  \n\n \n  ").is_empty());
    }

    #[test]
    fn reformatting_rendered_output_preserves_paragraphs() {
        let first = format_reading("one.\n\ntwo.\n\nthree.\n\nfour.");
        let rendered = first.to_text().replace("\u{2022} ", "");
        let second = format_reading(&rendered);
        assert_eq!(second.paragraphs.len(), first.paragraphs.len());
        let texts = |r: &FormattedReading| {
            r.paragraphs.iter().map(|p| p.text.clone()).collect::<Vec<_>>()
        };
        assert_eq!(texts(&second), texts(&first));
    }
}
