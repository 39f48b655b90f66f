use std::sync::Arc;

use mystic_relay::prelude::*;
use mystic_relay::vendors::together::TogetherProvider;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), UpstreamError> {
    let relay = Relay::new(Arc::new(TogetherProvider::from_env()?));

    let request = GenerationRequest::new(
        "The Moon (intuition, illusion), Justice (balance, truth), The Tower (upheaval)",
        SpreadKind::ThreeCard,
        "What does this year hold for my work?",
    );

    let (sink, mut frames) = DownstreamSink::channel(32);
    let printer = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            print!("{}", String::from_utf8_lossy(&frame));
        }
    });

    let outcome = relay.run(request, sink).await;
    let _ = printer.await;

    match outcome {
        RelayOutcome::Completed(reading) => println!("\n---\n{}", reading.to_text()),
        other => eprintln!("relay ended without a reading: {other:?}"),
    }
    Ok(())
}
