use crate::reading::{GenerationRequest, SpreadKind};

/// System/user message pair sent to the provider.
///
/// The chat dialect sends both roles separately; the legacy completion
/// dialect joins them into a single prompt string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadingPrompt {
    pub system: String,
    pub user: String,
}

const READER_SYSTEM_PROMPT: &str = "You are a mystical tarot reader providing insights based on \
tarot cards. Your readings have a mystical tone, relate directly to the query, and provide \
thoughtful guidance.";

/// Builds the streaming reading prompt for a request.
pub fn reading_prompt(request: &GenerationRequest) -> ReadingPrompt {
    let spread_guidance = match request.spread {
        SpreadKind::Single => {
            "Please provide a detailed and insightful tarot reading based on this single card."
        }
        SpreadKind::TwoCard => {
            "Please provide a detailed and insightful tarot reading based on these two cards. \
             The first card represents the current situation, and the second represents \
             potential outcomes."
        }
        SpreadKind::ThreeCard => {
            "Please provide a detailed and insightful tarot reading based on these three cards. \
             The first card represents the past, the second represents the present, and the \
             third represents the future."
        }
    };

    let drawn = if request.spread == SpreadKind::Single {
        "Card drawn"
    } else {
        "Cards drawn"
    };
    let mut user = format!(
        "User query: \"{}\"\n{drawn}: {}\n{spread_guidance}",
        request.query, request.cards
    );
    if let Some(locale) = request.locale.as_deref().filter(|l| !l.trim().is_empty()) {
        user.push_str(&format!("\nWrite the reading in the \"{locale}\" locale."));
    }

    ReadingPrompt {
        system: READER_SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// Builds the non-streaming summarization prompt for a finished reading.
pub fn summary_prompt(reading: &str, locale: Option<&str>) -> ReadingPrompt {
    let mut system = String::from(
        "You are a tarot reading summariser. Summarise the reading of every card drawn, then \
         finish with a total reading summary, using 1-3 sentences per card. Respond with JSON \
         only, no prose around it, in exactly this shape: \
         {\"cards\":[{\"title\":\"<card title>\",\"content\":\"<card summary>\"}],\
         \"summary\":\"<total reading summary>\"}. \
         Emit one cards entry per card in the reading, in the order they were drawn.",
    );
    if let Some(locale) = locale.filter(|l| !l.trim().is_empty()) {
        system.push_str(&format!(
            " Write all titles and summaries in the \"{locale}\" locale."
        ));
    }

    ReadingPrompt {
        system,
        user: reading.to_string(),
    }
}

/// Builds the single bounded repair prompt for invalid summarizer output.
pub fn repair_prompt(invalid: &str) -> ReadingPrompt {
    ReadingPrompt {
        system: "The following text was supposed to be valid JSON of the shape \
                 {\"cards\":[{\"title\":\"...\",\"content\":\"...\"}],\"summary\":\"...\"} \
                 but is not. Convert it into valid JSON of exactly that shape, preserving the \
                 wording. Respond with the JSON only."
            .to_string(),
        user: invalid.to_string(),
    }
}
