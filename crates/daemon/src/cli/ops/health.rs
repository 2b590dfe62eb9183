use clap::Args;

use docvault_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("health check failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:   {}", state.docvault_dir.display()));
                lines.push("  config.toml: OK".to_string());
                lines.push(format!("  broker_port: {}", state.config.broker_port));
                lines.push(format!("  object_key:  {}", state.config.object_key));
                lines.push(format!(
                    "  bucket:      {}",
                    state.config.storage.bucket.as_deref().unwrap_or("(unset)")
                ));
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        let base = ctx.client.base_url();
        let client = ctx.client.http_client();

        lines.push(String::new());
        lines.push(format!("Broker ({}):", base));

        for probe in ["livez", "readyz"] {
            let url = format!("{}/_status/{}", base.as_str().trim_end_matches('/'), probe);
            let line = match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => format!("  {:<7} OK", probe),
                Ok(resp) => format!("  {:<7} UNHEALTHY ({})", probe, resp.status()),
                Err(_) => format!("  {:<7} NOT REACHABLE", probe),
            };
            lines.push(line);
        }

        Ok(lines.join("\n"))
    }
}
