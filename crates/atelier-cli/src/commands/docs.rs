use crate::app::AppContext;
use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum DocAction {
    /// List the active project's documents
    List,
    /// Generate a summary document with the active agent
    Generate,
    /// Upload a file into the project's document pool
    Upload { path: PathBuf },
    /// Remove a project file by id
    Remove { id: String },
}

pub async fn run(app: &AppContext, action: Option<DocAction>) -> Result<()> {
    match action.unwrap_or(DocAction::List) {
        DocAction::List => {
            app.documents.ensure_summary_loaded().await?;
            let documents = app.documents.documents().await;
            if documents.is_empty() {
                println!("no documents");
            }
            for document in documents {
                let kb = if document.is_knowledge_base {
                    " [knowledge base]"
                } else {
                    ""
                };
                println!("{} ({}, {}){kb}", document.name, document.id, document.mime_type);
            }
        }
        DocAction::Generate => {
            app.documents.generate_summary().await?;
            println!("summary generated");
        }
        DocAction::Upload { path } => {
            let data = tokio::fs::read(&path).await?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            app.documents.upload_file(&name, &data).await?;
            println!("uploaded {name}");
        }
        DocAction::Remove { id } => {
            app.documents.remove_file(&id).await?;
            println!("removed {id}");
        }
    }
    Ok(())
}
