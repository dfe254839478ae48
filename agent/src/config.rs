//! Configuration loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name searched for by [`ReportFileConfig::load`]
pub const CONFIG_FILE: &str = ".report.toml";

/// Find a config file by walking up the directory tree, then checking global config.
///
/// Search order:
/// 1. Current directory and parent directories (walking up to root)
/// 2. Global config at ~/.config/daily-report/
fn find_config_file(filename: &str) -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("daily-report").join(filename);
        if global_path.exists() {
            return Some(global_path);
        }
    }

    None
}

/// Top-level report configuration (from .report.toml)
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReportFileConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

/// LLM configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_ollama_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

/// Data API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_sales_url")]
    pub sales_url: String,
    #[serde(default = "default_marketing_url")]
    pub marketing_url: String,
    /// Per-request timeout for the data APIs
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Where artifacts are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_pdf_name")]
    pub pdf_name: String,
    #[serde(default = "default_spreadsheet_name")]
    pub spreadsheet_name: String,
}

/// Mail relay (credentials always come from the environment)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_sales_url() -> String {
    "http://localhost:8001/sales".to_string()
}

fn default_marketing_url() -> String {
    "http://localhost:8002/marketing".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_pdf_name() -> String {
    "company_report.pdf".to_string()
}

fn default_spreadsheet_name() -> String {
    "company_data.xlsx".to_string()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: default_ollama_url(),
            model: default_model(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            sales_url: default_sales_url(),
            marketing_url: default_marketing_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            pdf_name: default_pdf_name(),
            spreadsheet_name: default_spreadsheet_name(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
        }
    }
}

impl OutputConfig {
    pub fn pdf_path(&self) -> PathBuf {
        self.dir.join(&self.pdf_name)
    }

    pub fn spreadsheet_path(&self) -> PathBuf {
        self.dir.join(&self.spreadsheet_name)
    }
}

impl ReportFileConfig {
    /// Load config from .report.toml
    ///
    /// Search order:
    /// 1. Walk up directory tree from cwd looking for .report.toml
    /// 2. Check ~/.config/daily-report/.report.toml (global fallback)
    /// 3. Fall back to defaults
    pub fn load() -> Result<Self> {
        if let Some(config_path) = find_config_file(CONFIG_FILE) {
            tracing::debug!("Loading config from: {}", config_path.display());
            return Self::load_from_path(&config_path);
        }

        tracing::debug!("No {} found, using defaults", CONFIG_FILE);
        Ok(Self::default())
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ReportFileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Apply SMTP_HOST / SMTP_PORT overrides from the environment
    pub fn apply_mail_env(&mut self) {
        self.apply_mail_overrides(
            std::env::var("SMTP_HOST").ok(),
            std::env::var("SMTP_PORT").ok(),
        );
    }

    fn apply_mail_overrides(&mut self, host: Option<String>, port: Option<String>) {
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            self.mail.smtp_host = host;
        }

        if let Some(port) = port {
            match port.trim().parse::<u16>() {
                Ok(port) => self.mail.smtp_port = port,
                Err(_) => tracing::warn!(
                    "Ignoring invalid SMTP_PORT '{}', using {}",
                    port,
                    self.mail.smtp_port
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ReportFileConfig::default();
        assert_eq!(config.llm.url, "http://localhost:11434");
        assert_eq!(config.mail.smtp_host, "smtp.gmail.com");
        assert_eq!(config.mail.smtp_port, 465);
        assert_eq!(config.output.pdf_path(), PathBuf::from("reports/company_report.pdf"));
        assert_eq!(
            config.output.spreadsheet_path(),
            PathBuf::from("reports/company_data.xlsx")
        );
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
                [llm]
                model = "mixtral:8x7b"

                [sources]
                sales_url = "http://sales-api:8000/sales"

                [output]
                dir = "/tmp/out"
            "#,
        )
        .unwrap();

        let config = ReportFileConfig::load_from_path(&path).unwrap();
        assert_eq!(config.llm.model, "mixtral:8x7b");
        assert_eq!(config.llm.url, "http://localhost:11434");
        assert_eq!(config.sources.sales_url, "http://sales-api:8000/sales");
        assert_eq!(config.sources.marketing_url, "http://localhost:8002/marketing");
        assert_eq!(config.sources.timeout_secs, 30);
        assert_eq!(config.output.pdf_path(), PathBuf::from("/tmp/out/company_report.pdf"));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[llm\nurl = ").unwrap();
        assert!(ReportFileConfig::load_from_path(&path).is_err());
    }

    #[test]
    fn test_mail_overrides() {
        let mut config = ReportFileConfig::default();
        config.apply_mail_overrides(Some("smtp.example.com".to_string()), Some("587".to_string()));
        assert_eq!(config.mail.smtp_host, "smtp.example.com");
        assert_eq!(config.mail.smtp_port, 587);

        config.apply_mail_overrides(None, Some("not-a-port".to_string()));
        assert_eq!(config.mail.smtp_port, 587);
    }
}
