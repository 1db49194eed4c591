//! `docent chat`: interactive or single-message chat.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docent_agent::{Assistant, DocumentAssistant, ModelGateway, SessionHost, ToolAssistant};
use docent_channels::CliChannel;
use docent_config::AppConfig;
use docent_core::channel::{Channel, ChannelEvent};
use docent_core::error::ChannelError;
use docent_core::message::ConversationId;
use docent_core::provider::Provider;
use docent_core::retrieval::ContextProvider;
use docent_core::session::{Settings, SettingsUpdate};
use docent_retrieval::{EmbeddingIndex, EmptyContext, TextSplitter, load_documents};

use crate::ChatMode;

pub struct ChatOptions {
    pub mode: ChatMode,
    pub document: Option<PathBuf>,
    pub no_context: bool,
    pub message: Option<String>,
}

pub async fn run(config_path: Option<&Path>, options: ChatOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let provider = super::default_provider(&config)?;
    let gateway = ModelGateway::from_config(provider.clone(), &config);
    let settings = Settings {
        use_context: config.retrieval.use_context && !options.no_context,
    };

    let mut banner = vec![
        ("Provider", config.default_provider.clone()),
        ("Model", config.default_model.clone()),
    ];

    match options.mode {
        ChatMode::Document => {
            let document = options
                .document
                .or_else(|| config.retrieval.document_path.as_ref().map(PathBuf::from));
            let (context, source) = build_context(provider, &config, document.as_deref()).await?;
            banner.push(("Document", source));
            banner.push((
                "Context",
                if settings.use_context { "on" } else { "off" }.to_string(),
            ));

            let assistant = DocumentAssistant::from_config(gateway, context, &config);
            let host = SessionHost::new(assistant).with_initial_settings(settings);
            converse(host, &banner, options.message).await
        }
        ChatMode::Tool => {
            let tools = Arc::new(docent_tools::default_registry());
            banner.push(("Tools", tools.names().join(", ")));

            let assistant = ToolAssistant::from_config(gateway, tools, &config);
            let host = SessionHost::new(assistant).with_initial_settings(settings);
            converse(host, &banner, options.message).await
        }
    }
}

/// Index `document`, or fall back to an empty context when none is given.
async fn build_context(
    provider: Arc<dyn Provider>,
    config: &AppConfig,
    document: Option<&Path>,
) -> Result<(Arc<dyn ContextProvider>, String), Box<dyn std::error::Error>> {
    let Some(path) = document else {
        tracing::warn!("No document configured; context answers will find nothing");
        return Ok((Arc::new(EmptyContext), "(none)".into()));
    };

    let documents = load_documents(path).await?;
    let splitter = TextSplitter::new(config.retrieval.chunk_size, config.retrieval.chunk_overlap);

    eprint!("  Indexing {}...", path.display());
    let index = EmbeddingIndex::build(
        provider,
        &config.retrieval.embedding_model,
        &documents,
        &splitter,
    )
    .await?;
    eprint!("\r");

    let source = format!(
        "{} ({} files, {} chunks)",
        path.display(),
        documents.len(),
        index.len().await
    );
    Ok((Arc::new(index), source))
}

async fn converse<A: Assistant>(
    mut host: SessionHost<A>,
    banner: &[(&str, String)],
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = host.start();

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = host.on_message(&id, &msg).await;
        eprint!("\r              \r");
        host.end(&id);
        println!("{}", reply?);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  docent: {} assistant", host.assistant().mode());
    println!();
    for (label, value) in banner {
        println!("  {:<10} {value}", format!("{label}:"));
    }
    println!();
    println!("  Type your message and press Enter.");
    println!("  `/context on|off|reset` toggles document context.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let channel = CliChannel::new();
    let mut rx = channel.start().await.map_err(|e| format!("Channel error: {e}"))?;

    prompt()?;
    while let Some(event) = rx.recv().await {
        match event {
            Ok(ChannelEvent::Message(msg)) => {
                eprint!("  ...");
                let reply = host.on_message(&id, &msg.content).await;
                eprint!("\r     \r");
                match reply {
                    Ok(reply) => {
                        println!();
                        println!("  Assistant > {reply}");
                        println!();
                    }
                    Err(e) => eprintln!("  [Error] {e}"),
                }
            }
            Ok(ChannelEvent::SettingsUpdate(update)) => match apply_settings(&mut host, &id, &update) {
                Ok(enabled) => eprintln!("  (context {})", if enabled { "on" } else { "off" }),
                Err(e) => eprintln!("  [Error] {e}"),
            },
            Ok(ChannelEvent::End) => {
                host.end(&id);
                println!("  Goodbye!");
                break;
            }
            Err(ChannelError::ConnectionLost(reason)) => {
                host.end(&id);
                return Err(format!("Input closed: {reason}").into());
            }
            Err(e) => eprintln!("  [Error] {e}"),
        }
        prompt()?;
    }

    Ok(())
}

/// Apply a settings change to the session. Returns the resulting context
/// toggle for status output; a settings change never produces a reply.
fn apply_settings<A: Assistant>(
    host: &mut SessionHost<A>,
    id: &ConversationId,
    update: &SettingsUpdate,
) -> Result<bool, ChannelError> {
    host.on_settings_update(id, update)?;
    Ok(host.session(id).is_some_and(|s| s.settings.use_context))
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docent_core::error::ProviderError;
    use docent_core::provider::{ProviderRequest, ProviderResponse};

    struct SilentProvider;

    #[async_trait::async_trait]
    impl Provider for SilentProvider {
        fn name(&self) -> &str {
            "silent"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            panic!("a settings change must not reach the model");
        }
    }

    fn host() -> SessionHost<DocumentAssistant> {
        let gateway = ModelGateway::new(Arc::new(SilentProvider), "gpt-test");
        SessionHost::new(DocumentAssistant::new(gateway, Arc::new(EmptyContext)))
    }

    #[test]
    fn settings_change_reports_toggle_and_records_nothing() {
        let mut host = host();
        let id = host.start();

        assert!(!apply_settings(&mut host, &id, &SettingsUpdate::use_context(false)).unwrap());
        assert!(apply_settings(&mut host, &id, &SettingsUpdate::new()).unwrap());
        assert!(host.session(&id).unwrap().conversation.is_empty());
    }

    #[test]
    fn settings_change_for_ended_session_is_ignored() {
        let mut host = host();
        let id = host.start();
        host.end(&id);

        assert!(!apply_settings(&mut host, &id, &SettingsUpdate::use_context(true)).unwrap());
    }
}
