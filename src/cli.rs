//! Interface de linha de comando do prodrec baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (run, demo, status)
//! e flags globais (--formatter, --verbose).

use clap::{Parser, Subcommand, ValueEnum};

/// prodrec — acumulador de ciclo de vida de jobs de produção.
#[derive(Debug, Parser)]
#[command(name = "prodrec", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Variante do documento de saída, sobrepõe a configuração.
    #[arg(long, global = true)]
    pub formatter: Option<FormatterArg>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Variante de formatação aceita pela CLI, mapeada para
/// [`FormatterKind`](crate::format::FormatterKind) internamente.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatterArg {
    /// Quatro campos de fator numerados (Factor1..Factor4).
    Fixed,
    /// Subcoleção aninhada `Factors` com campos nomeados.
    Nested,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Consome eventos (JSON por linha) e entrega os registros finalizados.
    Run {
        /// Arquivo de eventos; lê da entrada padrão quando ausente.
        #[arg(long)]
        file: Option<String>,
    },

    /// Mostra a configuração efetiva do acumulador.
    Status,

    /// Executa a demonstração embutida de um ciclo de job completo.
    Demo,
}
