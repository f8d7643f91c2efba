use crate::app::AppContext;
use anyhow::Result;

pub async fn login(app: &AppContext, token: &str) -> Result<()> {
    app.session.store_token(token).await?;
    app.bootstrap().await?;
    match app.session.current_user().await {
        Some(user) => println!("signed in as {} <{}>", user.name, user.email),
        None => println!("token stored"),
    }
    Ok(())
}

pub async fn logout(app: &AppContext) {
    app.coordinator.reset().await;
    println!("signed out");
}

pub async fn status(app: &AppContext) {
    match app.session.current_user().await {
        Some(user) => println!("user: {} <{}>", user.name, user.email),
        None => {
            println!("not signed in");
            return;
        }
    }
    match app.projects.active_project().await {
        Some(project) => println!("project: {} ({})", project.name, project.id),
        None => println!("project: none"),
    }
    match app.agents.active_agent().await {
        Some(agent) => println!("agent: {} ({})", agent.name, agent.id),
        None => println!("agent: none"),
    }
}
