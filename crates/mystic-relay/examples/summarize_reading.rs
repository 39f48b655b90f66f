use std::sync::Arc;

use mystic_relay::prelude::*;
use mystic_relay::vendors::together::TogetherProvider;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), SummaryError> {
    let summarizer = Summarizer::new(Arc::new(TogetherProvider::from_env()?));

    let reading = "In the realm of the past, The Moon suggests your experiences were shrouded \
in illusion and doubt.\n\nIn the present, Justice restores balance and calls for honesty.\n\n\
Looking ahead, The Tower foretells sudden change that clears the way for renewal.";

    let artifact = summarizer.summarize(reading, None).await?;
    for card in &artifact.cards {
        println!("{}: {}", card.title, card.content);
    }
    println!("---\n{}", artifact.summary);
    Ok(())
}
