/// Disparador de mensagens a partir do Google Sheets
///
/// Fluxo:
/// - Lê as abas configuradas (uma por campanha) da planilha
/// - Normaliza os números para o formato 55 + DDD + número
/// - Envia o template da campanha para cada linha "Pendente"
/// - Grava "Concluído" ou "Erro" na coluna Status
///
/// Roda em ciclos até receber Ctrl+C ou SIGTERM.

use anyhow::Context;
use std::time::Duration;

use disparador_planilhas::config::Settings;
use disparador_planilhas::services::{
    shutdown_channel, Campaign, Dispatcher, MessageApiService, PassScheduler, SheetSource, Throttle,
};
use disparador_planilhas::utils::logging::*;
use sheets::{ServiceAccountAuth, SheetsClient, SPREADSHEETS_SCOPE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 🔧 Carregar variáveis de ambiente do arquivo .env (se existir)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    init_tracing();

    if dotenv_loaded {
        tracing::info!("✅ Arquivo .env carregado com sucesso");
    } else {
        tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
    }

    let settings = Settings::new().context("Falha ao carregar configurações")?;
    log_config_loaded(
        &std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()),
        settings.campaigns.len(),
    );

    // Google Sheets
    let auth = ServiceAccountAuth::from_file(&settings.google.credentials_file, &[SPREADSHEETS_SCOPE])
        .with_context(|| {
            format!(
                "Falha ao ler credenciais da conta de serviço em {}",
                settings.google.credentials_file
            )
        })?;
    log_info(&format!("🔑 Conta de serviço: {}", auth.client_email()));

    let base_url = settings
        .google
        .sheets_base_url
        .as_deref()
        .filter(|url| !url.trim().is_empty());
    let client = match base_url {
        Some(base_url) => SheetsClient::with_base_url(auth, base_url),
        None => SheetsClient::new(auth),
    }
    .context("Falha ao criar cliente do Google Sheets")?;
    log_info(&format!("📊 Google Sheets API: {}", client.base_url()));
    let spreadsheet = client.open_by_key(settings.google.sheet_id.clone());

    let mut campaigns = Vec::with_capacity(settings.campaigns.len());
    for campaign in &settings.campaigns {
        let worksheet = spreadsheet
            .worksheet(&campaign.sheet)
            .await
            .with_context(|| format!("Falha ao abrir a aba '{}'", campaign.sheet))?;
        campaigns.push(Campaign::new(
            Box::new(SheetSource::new(worksheet)),
            campaign.template.clone(),
        ));
    }
    log_info(&format!("📄 Planilha {} aberta com {} abas", spreadsheet.id(), campaigns.len()));

    // API de mensagens
    let sender = MessageApiService::new(
        settings.messaging.api_url.clone(),
        settings.messaging.api_key.clone(),
        settings.messaging.timeout_seconds,
    )
    .context("Falha ao criar cliente da API de mensagens")?;
    log_info(&format!("📨 API de mensagens: {}", sender.api_url()));

    let (trigger, token) = shutdown_channel();
    let dispatch = &settings.dispatch;
    let dispatcher = Dispatcher::new(
        sender,
        Throttle::new(dispatch.min_delay_seconds, dispatch.max_delay_seconds),
        Duration::from_secs(dispatch.source_retry_seconds),
        token,
    );
    let scheduler = PassScheduler::new(
        dispatcher,
        campaigns,
        Duration::from_secs(dispatch.cycle_interval_seconds),
    );

    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    if dispatch.normalize_on_startup {
        scheduler.normalize_all().await;
    }

    scheduler.run().await;

    log_info("🛑 Disparador encerrado");
    Ok(())
}

/// Resolve no primeiro Ctrl+C ou SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error(&format!("Falha ao instalar handler de Ctrl+C: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log_error(&format!("Falha ao instalar handler de SIGTERM: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM, shutting down gracefully...");
        }
    }
}
