use crate::app::AppContext;
use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List all projects
    List,
    /// Switch the active project
    Select { id: String },
}

pub async fn run(app: &AppContext, action: Option<ProjectAction>) -> Result<()> {
    match action.unwrap_or(ProjectAction::List) {
        ProjectAction::List => {
            let active = app.projects.active_project_id().await;
            for project in app.projects.projects().await {
                let marker = if active.as_deref() == Some(project.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} {} ({}, {} agents)",
                    project.name, project.id, project.agent_count
                );
            }
        }
        ProjectAction::Select { id } => {
            app.coordinator.switch_project(&id).await?;
            if let Some(project) = app.projects.active_project().await {
                println!("active project: {}", project.name);
            }
        }
    }
    Ok(())
}
