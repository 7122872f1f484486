use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Inicializa o subscriber de tracing (RUST_LOG, padrão `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // try_init: em testes o subscriber pode já estar instalado
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn log_config_loaded(env: &str, campaigns: usize) {
    info!("Configuration loaded successfully for environment: {} ({} campanhas)", env, campaigns);
}

pub fn log_number_corrected(number: &str, row: u32) {
    info!("Corrigido e formatado o número para {} na linha {}", number, row);
}

pub fn log_invalid_number(raw: &str, row: u32) {
    warn!("Formato inválido para o número '{}' na linha {}. Não foi possível corrigir.", raw, row);
}

pub fn log_message_sent(number: &str, response: &str) {
    info!("Mensagem enviada para {}: {}", number, response);
}

pub fn log_send_failed(number: &str, error: &str) {
    error!("Erro ao enviar mensagem para {}: {}", number, error);
}

pub fn log_status_updated(status: &str, number: &str) {
    info!("Status atualizado para \"{}\" para {}", status, number);
}

pub fn log_row_skipped(number: &str, status: &str) {
    info!("Pulando número {} - Status: {}", number, status);
}

pub fn log_waiting(seconds: u64) {
    info!("Aguardando {} minutos...", seconds / 60);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}
