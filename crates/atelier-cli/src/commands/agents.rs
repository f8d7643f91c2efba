use crate::app::AppContext;
use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum AgentAction {
    /// List the agents of the active project
    List,
    /// Switch the active agent
    Select { id: String },
}

pub async fn run(app: &AppContext, action: Option<AgentAction>) -> Result<()> {
    match action.unwrap_or(AgentAction::List) {
        AgentAction::List => {
            let active = app.agents.active_agent_id().await;
            for agent in app.agents.agents().await {
                let marker = if active.as_deref() == Some(agent.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                let role = agent.role.as_deref().unwrap_or("-");
                println!("{marker} {} ({}, role: {role})", agent.name, agent.id);
            }
        }
        AgentAction::Select { id } => {
            app.agents.select_agent(&id).await;
            match app.agents.active_agent().await {
                Some(agent) if agent.id == id => println!("active agent: {}", agent.name),
                _ => println!("no such agent: {id}"),
            }
        }
    }
    Ok(())
}
