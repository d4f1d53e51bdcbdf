//! Tipos de erro para a entrega de registros ao endpoint externo.
//!
//! Define [`SinkError`] com variantes para erros HTTP retornados pelo
//! servidor e falhas de rede. Usa `thiserror` para derivar `Display` e
//! `Error` automaticamente a partir dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao submeter um registro ao destino.
///
/// As variantes cobrem os dois cenários de falha na entrega:
/// - [`ApiError`](SinkError::ApiError) — o servidor respondeu com um
///   status HTTP de erro (4xx/5xx)
/// - [`NetworkError`](SinkError::NetworkError) — falha na camada de rede
#[derive(Debug, Error)]
pub enum SinkError {
    /// Erro retornado pelo servidor (ex.: 400 corpo inválido, 500 erro interno).
    /// Contém o código de status HTTP e a mensagem de erro do corpo da resposta.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    /// Encapsula o erro original do `reqwest` via `#[from]`.
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = SinkError::ApiError {
            status: 500,
            message: "internal error".into(),
        };
        assert_eq!(err.to_string(), "API error (status 500): internal error");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SinkError>();
    }
}
