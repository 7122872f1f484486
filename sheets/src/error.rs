//! Tipos de erro para o crate sheets

use thiserror::Error;

/// Erros do cliente Google Sheets
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Erro de requisição HTTP (rede, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Erro da API do Google Sheets (status code não-2xx)
    #[error("Google Sheets API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Falha ao obter token de acesso da conta de serviço
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Arquivo de credenciais ilegível
    #[error("Failed to read credentials file: {0}")]
    IoError(#[from] std::io::Error),

    /// Erro de parsing JSON
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Aba (worksheet) não encontrada na planilha
    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    /// Referência de célula inválida (linha/coluna zero)
    #[error("Invalid cell reference: {0}")]
    InvalidCell(String),
}

impl SheetsError {
    /// Erros retornados pela própria API (quota, permissão, 5xx)
    pub fn is_api_error(&self) -> bool {
        matches!(self, SheetsError::ApiError { .. })
    }
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, SheetsError>;
