//! Configuração do prodrec carregada a partir de `prodrec.toml`.
//!
//! A struct [`ProdrecConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `PRODREC_ENDPOINT` tem precedência sobre o arquivo.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use crate::format::FormatterKind;
use crate::sink::RetryPolicy;

/// Configuração de nível superior carregada de `prodrec.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProdrecConfig {
    /// URL do endpoint que recebe os documentos de registro.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Tópico lógico dos eventos de status de job.
    #[serde(default = "default_status_topic")]
    pub status_topic: String,

    /// Tópico lógico dos dados de processo (telemetria).
    #[serde(default = "default_telemetry_topic")]
    pub telemetry_topic: String,

    /// Variante do documento de saída: "fixed" ou "nested".
    #[serde(default = "default_formatter")]
    pub formatter: FormatterKind,

    /// Número total de tentativas de entrega por registro.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Atraso fixo em milissegundos entre tentativas de entrega.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Caminho do log de falhas de entrega (JSON por linha).
    #[serde(default = "default_failure_log")]
    pub failure_log: String,
}

// Valor padrão para o endpoint de entrega.
fn default_endpoint() -> String {
    "http://127.0.0.1:8080/records".to_string()
}

// Tópico padrão de status, compatível com o broker da planta.
fn default_status_topic() -> String {
    "Publish/Job/Status".to_string()
}

// Tópico padrão de telemetria.
fn default_telemetry_topic() -> String {
    "Publish/Job/Processdata".to_string()
}

// Variante padrão do documento: fatores aninhados.
fn default_formatter() -> FormatterKind {
    FormatterKind::Nested
}

// Valor padrão para tentativas de entrega: 3.
fn default_max_attempts() -> u32 {
    3
}

// Valor padrão para o atraso entre tentativas: 1000ms.
fn default_delay_ms() -> u64 {
    1000
}

// Caminho padrão do log de falhas.
fn default_failure_log() -> String {
    "failed_records.jsonl".to_string()
}

impl Default for ProdrecConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            status_topic: default_status_topic(),
            telemetry_topic: default_telemetry_topic(),
            formatter: default_formatter(),
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            failure_log: default_failure_log(),
        }
    }
}

impl ProdrecConfig {
    /// Carrega a configuração de `prodrec.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        let path = Path::new("prodrec.toml");
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<ProdrecConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração para o endpoint.
        if let Ok(endpoint) = std::env::var("PRODREC_ENDPOINT")
            && !endpoint.is_empty()
        {
            config.endpoint = endpoint;
        }

        Ok(config)
    }

    /// Política de retentativa de entrega derivada da configuração.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay_ms: self.delay_ms,
        }
    }
}
