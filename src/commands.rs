use crate::client::ChatClient;
use crate::config::Config;
use crate::health;
use crate::model::HealthStatus;
use anyhow::{Context, Result, bail};

pub async fn check_health(config: &Config) -> Result<()> {
    let client = ChatClient::new(config).context("Failed to create HTTP client")?;
    let status = health::probe(&client).await;

    println!("{} {}", status.label(), client.base_url());

    if status != HealthStatus::Healthy {
        bail!("Service at {} is not healthy", client.base_url());
    }
    Ok(())
}

pub async fn send_message(config: &Config, text: &str) -> Result<()> {
    let content = text.trim();
    if content.is_empty() {
        println!("Nothing to send.");
        return Ok(());
    }

    let client = ChatClient::new(config).context("Failed to create HTTP client")?;

    match client.chat(content).await {
        Ok(reply) => {
            println!("🤖 {}", reply.content);
            println!();
            println!("   ⏱  {}ms   🔢 {} tokens", reply.response_time, reply.token_count);
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, "Send failed");
            bail!("⚠️  {}", e.user_message())
        }
    }
}

pub fn init_config(config: &Config, force: bool) -> Result<()> {
    let path = &config.path;
    if path.exists() && !force {
        println!("📄 Config already exists at {}", path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    config.save()?;
    println!("✨ Wrote {}", path.display());
    println!("   base_url = {}", config.base_url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_to_the_chosen_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("custom.toml");
        let config = Config {
            base_url: "http://first:1".to_string(),
            home: dir.path().join("home"),
            path: custom.clone(),
            ..Config::default()
        };

        init_config(&config, false).unwrap();
        assert!(custom.exists());
        assert!(!config.home.join("config.toml").exists());

        let changed = Config {
            base_url: "http://second:2".to_string(),
            ..config.clone()
        };
        init_config(&changed, false).unwrap();
        assert_eq!(Config::from_file(&custom).unwrap().base_url, "http://first:1");

        init_config(&changed, true).unwrap();
        assert_eq!(Config::from_file(&custom).unwrap().base_url, "http://second:2");
    }
}
