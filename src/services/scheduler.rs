use std::time::Duration;

use crate::models::MessageTemplate;
use crate::services::dispatcher::{Dispatcher, PassReport};
use crate::services::message_api::MessageSender;
use crate::services::sources::RowSource;
use crate::utils::logging::*;

/// Aba da planilha e o template enviado para os contatos dela
pub struct Campaign {
    pub source: Box<dyn RowSource>,
    pub template: MessageTemplate,
}

impl Campaign {
    pub fn new(source: Box<dyn RowSource>, template: MessageTemplate) -> Self {
        Self { source, template }
    }
}

/// Loop principal: uma passada por campanha, na ordem configurada, seguida
/// da pausa entre ciclos
pub struct PassScheduler<M: MessageSender> {
    dispatcher: Dispatcher<M>,
    campaigns: Vec<Campaign>,
    cycle_interval: Duration,
}

impl<M: MessageSender> PassScheduler<M> {
    pub fn new(dispatcher: Dispatcher<M>, campaigns: Vec<Campaign>, cycle_interval: Duration) -> Self {
        Self {
            dispatcher,
            campaigns,
            cycle_interval,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<M> {
        &self.dispatcher
    }

    /// Formata os números de todas as abas antes do primeiro ciclo
    pub async fn normalize_all(&self) -> usize {
        let mut total = 0;
        for campaign in &self.campaigns {
            if self.dispatcher.shutdown_token().is_cancelled() {
                break;
            }
            total += self
                .dispatcher
                .normalize_source_numbers(campaign.source.as_ref())
                .await;
        }

        log_info(&format!("🔧 Formatação inicial concluída: {} números corrigidos", total));
        total
    }

    /// Executa uma passada em cada campanha
    pub async fn run_cycle(&self) -> Vec<PassReport> {
        let mut reports = Vec::with_capacity(self.campaigns.len());

        for campaign in &self.campaigns {
            if self.dispatcher.shutdown_token().is_cancelled() {
                break;
            }
            reports.push(
                self.dispatcher
                    .run_pass(campaign.source.as_ref(), &campaign.template)
                    .await,
            );
        }

        reports
    }

    /// Roda ciclos até o encerramento ser disparado; retorna quantos ciclos
    /// foram iniciados
    pub async fn run(&self) -> usize {
        let token = self.dispatcher.shutdown_token().clone();
        let names: Vec<&str> = self.campaigns.iter().map(|c| c.source.name()).collect();

        log_info(&format!(
            "🚀 Scheduler iniciado: abas [{}], ciclo a cada {}s",
            names.join(", "),
            self.cycle_interval.as_secs()
        ));

        let mut cycles = 0;
        while !token.is_cancelled() {
            cycles += 1;
            tracing::debug!("Ciclo {} iniciado", cycles);
            self.run_cycle().await;

            if !token.sleep(self.cycle_interval).await {
                break;
            }
        }

        log_info(&format!("🛑 Scheduler encerrado após {} ciclos", cycles));
        cycles
    }
}
