use crate::app::AppContext;
use anyhow::Result;
use atelier_core::chat::message::MessageRole;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ChatAction {
    /// Send a message to the active agent and print the reply
    Send { text: String },
    /// Print the active agent's conversation history
    History,
    /// Delete the active agent's conversation
    Clear,
}

pub async fn run(app: &AppContext, action: ChatAction) -> Result<()> {
    let Some(agent) = app.agents.active_agent().await else {
        println!("no active agent; run `atelier agents select <id>` first");
        return Ok(());
    };

    match action {
        ChatAction::Send { text } => {
            app.chat.ensure_messages_loaded(&agent.id).await?;
            app.chat.send_message(&text).await?;
            print_history(app).await;
        }
        ChatAction::History => {
            app.chat.ensure_messages_loaded(&agent.id).await?;
            print_history(app).await;
        }
        ChatAction::Clear => {
            app.chat.clear_chat().await?;
            println!("conversation cleared");
        }
    }
    Ok(())
}

async fn print_history(app: &AppContext) {
    for message in app.chat.messages().await {
        let speaker = match message.role {
            MessageRole::User => "you",
            MessageRole::Model => "agent",
        };
        if message.is_error {
            println!("[{speaker}, error] {}", message.text);
        } else {
            println!("[{speaker}] {}", message.text);
        }
    }
}
