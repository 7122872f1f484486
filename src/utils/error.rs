use thiserror::Error;

/// Erros fatais de inicialização: o processo encerra
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: variável {0} não configurada")]
    MissingSetting(&'static str),

    #[error("Configuration error: {0}")]
    InvalidSetting(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Google Sheets setup error: {0}")]
    Sheets(#[from] sheets::SheetsError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Erros operacionais recuperáveis: registrados no log e convertidos em
/// pausa (falha da planilha) ou status "Erro" (falha de envio)
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A API da planilha respondeu com erro (quota, permissão, 5xx)
    #[error("Erro na API do Google Sheets: {0}")]
    SourceApi(String),

    /// Falha de acesso à planilha (rede, autenticação, resposta ilegível)
    #[error("Erro ao processar planilha: {0}")]
    SourceAccess(String),

    /// Falha de transporte ao chamar a API de mensagens
    #[error("Falha no envio: {0}")]
    Send(String),

    /// A API de mensagens respondeu com status não-2xx
    #[error("API de mensagens respondeu {status}: {body}")]
    SendRejected { status: u16, body: String },
}

impl DispatchError {
    /// Erro ligado à fonte de dados (aborta a passada da planilha)
    pub fn is_source_error(&self) -> bool {
        matches!(self, DispatchError::SourceApi(_) | DispatchError::SourceAccess(_))
    }
}

impl From<sheets::SheetsError> for DispatchError {
    fn from(err: sheets::SheetsError) -> Self {
        if err.is_api_error() {
            DispatchError::SourceApi(err.to_string())
        } else {
            DispatchError::SourceAccess(err.to_string())
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        DispatchError::Send(err.to_string())
    }
}

pub type StartupResult<T> = Result<T, StartupError>;
pub type DispatchResult<T> = Result<T, DispatchError>;
