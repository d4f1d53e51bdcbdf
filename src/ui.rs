//! Interface de terminal do prodrec — spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores. O [`PipelineProgress`] acompanha visualmente o
//! consumo de eventos e a emissão de registros no terminal.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::PipelineSummary;

/// Indicador visual de progresso para o consumo do fluxo de eventos.
///
/// Exibe um spinner animado com contadores de mensagens consumidas e
/// registros emitidos, e mensagens coloridas para cada registro
/// finalizado (verde) e para entregas esgotadas (vermelho).
pub struct PipelineProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para registros emitidos.
    green: Style,
    // Estilo vermelho para entregas esgotadas.
    red: Style,
}

impl PipelineProgress {
    /// Inicia o spinner e retorna a instância de progresso.
    pub fn start() -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message("aguardando eventos...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    /// Atualiza os contadores exibidos no spinner.
    pub fn update(&self, messages: u64, records: u64) {
        self.pb
            .set_message(format!("{messages} eventos consumidos, {records} registros"));
    }

    /// Anuncia um registro finalizado sem interromper o spinner.
    pub fn record_emitted(&self, record_id: &str) {
        self.pb.println(format!(
            "  {} Registro emitido: {record_id}",
            self.green.apply_to("✓")
        ));
    }

    /// Finaliza o spinner e imprime o resumo da execução.
    pub fn finish(&self, summary: &PipelineSummary) {
        self.pb.finish_and_clear();
        println!(
            "{} mensagens, {} registros emitidos",
            summary.messages, summary.records
        );
        if summary.failed_deliveries > 0 {
            println!(
                "  {} {} entregas esgotadas (ver log de falhas)",
                self.red.apply_to("✗"),
                summary.failed_deliveries
            );
        }
    }
}
