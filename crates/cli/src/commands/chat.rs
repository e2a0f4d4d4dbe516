use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use wayfarer_core::nlu::NluRecognizer;
use wayfarer_core::telemetry::{AtomicSpecificationCounters, NoopTelemetrySink};
use wayfarer_core::{
    AppConfig, ChannelError, ConversationKey, MessageChannel, UnconfiguredRecognizer,
};
use wayfarer_dialog::{DialogRuntime, TurnDisposition};
use wayfarer_nlu::HttpNluClient;
use wayfarer_store::InMemoryConversationStore;

/// Prints the bot's side of the conversation to stdout.
struct StdoutChannel;

#[async_trait]
impl MessageChannel for StdoutChannel {
    async fn send(&self, _key: &ConversationKey, text: &str) -> Result<(), ChannelError> {
        println!("bot> {text}");
        Ok(())
    }
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let recognizer: Arc<dyn NluRecognizer> = if config.nlu.is_configured() {
        Arc::new(HttpNluClient::from_config(&config.nlu)?)
    } else {
        Arc::new(UnconfiguredRecognizer)
    };

    let runtime = DialogRuntime::new(
        recognizer,
        Arc::new(InMemoryConversationStore::default()),
        Arc::new(StdoutChannel),
        Arc::new(NoopTelemetrySink),
        Arc::new(AtomicSpecificationCounters::default()),
    );
    let key = ConversationKey::new("local-chat");

    println!("Wayfarer journey bot. Tell me where you want to go, or say 'bye' to leave.");
    let stdin = io::stdin();
    loop {
        print!("you> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }

        match runtime.on_turn(&key, utterance).await? {
            TurnDisposition::Cancelled => break,
            TurnDisposition::Active
            | TurnDisposition::Confirmed(_)
            | TurnDisposition::Declined => {}
        }
    }

    Ok(())
}
