//! `tara agents`: list a tenant's agents.

use tara_api::ApiClient;
use tara_config::Config;
use tracing::info;

pub(crate) async fn handle_agents(
    config: &Config,
    tenant_id: &str,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let mut client = ApiClient::from_config(&config.api)?;

    if let Some(email) = email {
        let password = password.ok_or_else(|| anyhow::anyhow!("--password is required with --email"))?;
        let login = client.login(&email, &password).await?;
        info!(user = %login.user.email, tenant = %login.tenant.organization_name, "Logged in");
    }

    let agents = client.tenant_agents(tenant_id).await?;
    if agents.is_empty() {
        println!("No agents for tenant {}", tenant_id);
        return Ok(());
    }

    println!("{:<20} {:<24} {:<6} {:<8} ENDPOINT", "AGENT", "NAME", "LANG", "ACTIVE");
    println!("{}", "-".repeat(80));
    for agent in agents {
        println!(
            "{:<20} {:<24} {:<6} {:<8} {}",
            agent.agent_id,
            agent.agent_name,
            agent.language_primary,
            if agent.is_active { "yes" } else { "no" },
            agent.websocket_url.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}
