//! Disparador: percorre as linhas de uma aba e envia a mensagem da campanha
//!
//! Para cada linha com status "Pendente":
//! 1. Normaliza o número (linha ignorada se não houver dígitos)
//! 2. Grava o número corrigido antes de enviar
//! 3. Envia o template renderizado com o nome do contato
//! 4. Grava "Concluído" (e pausa de 3 a 7 minutos) ou "Erro"
//!
//! Falhas de leitura/escrita na planilha abortam a passada daquela aba e são
//! seguidas de uma pausa fixa. Falhas de envio só marcam a linha como "Erro".

use rand::Rng;
use std::time::Duration;

use crate::models::{MessageTemplate, OutboundMessage, Row, RowStatus, NUMERO_COLUMN, STATUS_COLUMN};
use crate::services::message_api::MessageSender;
use crate::services::shutdown::ShutdownToken;
use crate::services::sources::RowSource;
use crate::utils::logging::*;
use crate::utils::{is_canonical, normalize_phone};
use crate::utils::DispatchResult;

/// Pausa aleatória entre envios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    min_secs: u64,
    max_secs: u64,
}

impl Throttle {
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs: min_secs.min(max_secs),
            max_secs: max_secs.max(min_secs),
        }
    }

    /// Sorteia a próxima pausa no intervalo fechado `[min, max]`
    pub fn next_delay(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs(secs)
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(180, 420)
    }
}

/// Resultado de uma passada por uma aba
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub source: String,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    pub invalid: usize,
    pub corrected: usize,
    /// A passada foi interrompida por falha na planilha
    pub aborted: bool,
    /// A passada foi interrompida por encerramento do processo
    pub cancelled: bool,
}

impl PassReport {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Default::default()
        }
    }
}

pub struct Dispatcher<M: MessageSender> {
    sender: M,
    throttle: Throttle,
    source_retry: Duration,
    shutdown: ShutdownToken,
}

impl<M: MessageSender> Dispatcher<M> {
    pub fn new(sender: M, throttle: Throttle, source_retry: Duration, shutdown: ShutdownToken) -> Self {
        Self {
            sender,
            throttle,
            source_retry,
            shutdown,
        }
    }

    pub fn sender(&self) -> &M {
        &self.sender
    }

    pub fn shutdown_token(&self) -> &ShutdownToken {
        &self.shutdown
    }

    /// Processa todas as linhas da aba uma vez
    ///
    /// Nunca retorna erro: falhas da planilha são registradas, seguidas da
    /// pausa de nova tentativa e refletidas em `PassReport::aborted`.
    pub async fn run_pass(&self, source: &dyn RowSource, template: &MessageTemplate) -> PassReport {
        let mut report = PassReport::new(source.name());

        log_info(&format!("📋 Iniciando passada na aba '{}'", source.name()));

        if let Err(e) = self.process_rows(source, template, &mut report).await {
            if e.is_source_error() {
                log_error(&format!("[{}] Falha ao acessar a planilha: {}", source.name(), e));
            } else {
                log_error(&format!("[{}] Passada interrompida: {}", source.name(), e));
            }
            report.aborted = true;

            log_info(&format!(
                "⏳ Nova tentativa da aba '{}' em {}s",
                source.name(),
                self.source_retry.as_secs()
            ));
            if !self.shutdown.sleep(self.source_retry).await {
                report.cancelled = true;
            }
        }

        log_info(&format!(
            "✅ Passada '{}' finalizada: {} enviadas, {} com erro, {} puladas, {} inválidas, {} números corrigidos",
            report.source, report.sent, report.failed, report.skipped, report.invalid, report.corrected
        ));

        report
    }

    async fn process_rows(
        &self,
        source: &dyn RowSource,
        template: &MessageTemplate,
        report: &mut PassReport,
    ) -> DispatchResult<()> {
        let rows = source.read_rows().await?;

        for row in rows {
            if self.shutdown.is_cancelled() {
                report.cancelled = true;
                break;
            }

            if !row.status.is_pending() {
                log_row_skipped(&row.numero, row.status.as_str());
                report.skipped += 1;
                continue;
            }

            let Some(number) = normalize_phone(&row.numero) else {
                log_invalid_number(&row.numero, row.index);
                report.invalid += 1;
                continue;
            };

            if number != row.numero {
                source.update_cell(row.index, NUMERO_COLUMN, &number).await?;
                log_number_corrected(&number, row.index);
                report.corrected += 1;
            }

            if !is_canonical(&number) {
                log_warning(&format!(
                    "Número {} na linha {} não tem o formato 55 + DDD + 9 dígitos; enviando mesmo assim",
                    number, row.index
                ));
            }

            let sent = self.send_row(source, template, &row, number).await?;
            if sent {
                report.sent += 1;

                let delay = self.throttle.next_delay();
                log_waiting(delay.as_secs());
                if !self.shutdown.sleep(delay).await {
                    report.cancelled = true;
                    break;
                }
            } else {
                report.failed += 1;
            }
        }

        Ok(())
    }

    /// Envia a mensagem e grava o status; `Ok(false)` quando o envio falhou
    async fn send_row(
        &self,
        source: &dyn RowSource,
        template: &MessageTemplate,
        row: &Row,
        number: String,
    ) -> DispatchResult<bool> {
        let message = OutboundMessage {
            number,
            text: template.render(&row.nome),
        };

        let (status, sent) = match self.sender.send(&message).await {
            Ok(response) => {
                log_message_sent(&message.number, &response);
                (RowStatus::Concluido, true)
            }
            Err(e) => {
                log_send_failed(&message.number, &e.to_string());
                (RowStatus::Erro, false)
            }
        };

        source.update_cell(row.index, STATUS_COLUMN, status.as_str()).await?;
        log_status_updated(status.as_str(), &message.number);

        Ok(sent)
    }

    /// Formata todos os números da aba, independente do status
    ///
    /// Executado uma vez na inicialização. Falhas são apenas registradas.
    /// Retorna quantas células foram reescritas.
    pub async fn normalize_source_numbers(&self, source: &dyn RowSource) -> usize {
        let mut corrected = 0;

        if let Err(e) = self.rewrite_numbers(source, &mut corrected).await {
            log_error(&format!("Erro ao formatar números da aba '{}': {}", source.name(), e));
        }

        corrected
    }

    async fn rewrite_numbers(&self, source: &dyn RowSource, corrected: &mut usize) -> DispatchResult<()> {
        for row in source.read_rows().await? {
            if row.numero.is_empty() {
                continue;
            }
            if let Some(number) = normalize_phone(&row.numero) {
                if number != row.numero {
                    source.update_cell(row.index, NUMERO_COLUMN, &number).await?;
                    log_info(&format!("Número formatado para {} na linha {}", number, row.index));
                    *corrected += 1;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::message_api::tests::RecordingSender;
    use crate::services::shutdown::{shutdown_channel, ShutdownTrigger};
    use crate::services::sources::memory::{CellWrite, MemorySource};
    use tokio::time::Instant;

    fn row(index: u32, numero: &str, status: RowStatus, nome: &str) -> Row {
        Row {
            index,
            numero: numero.to_string(),
            status,
            nome: nome.to_string(),
        }
    }

    fn write(row: u32, column: u32, value: &str) -> CellWrite {
        CellWrite {
            row,
            column,
            value: value.to_string(),
        }
    }

    fn dispatcher(sender: RecordingSender) -> (Dispatcher<RecordingSender>, ShutdownTrigger) {
        let (trigger, token) = shutdown_channel();
        let dispatcher = Dispatcher::new(sender, Throttle::default(), Duration::from_secs(60), token);
        (dispatcher, trigger)
    }

    #[test]
    fn test_throttle_stays_in_range() {
        let throttle = Throttle::default();
        for _ in 0..200 {
            let delay = throttle.next_delay().as_secs();
            assert!((180..=420).contains(&delay));
        }
        assert_eq!(Throttle::new(5, 5).next_delay(), Duration::from_secs(5));
        assert_eq!(Throttle::new(9, 3), Throttle::new(3, 9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_row_is_corrected_sent_and_completed() {
        let source = MemorySource::new(
            "Automação",
            vec![row(2, "(11) 99999-9999", RowStatus::Pendente, "Ana")],
        );
        let (dispatcher, _trigger) = dispatcher(RecordingSender::ok());

        let report = dispatcher
            .run_pass(&source, &MessageTemplate::new("Olá {name}"))
            .await;

        assert_eq!(
            source.writes(),
            vec![write(2, 2, "5511999999999"), write(2, 3, "Concluído")]
        );
        let sent = dispatcher.sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].number, "5511999999999");
        assert_eq!(sent[0].text, "Olá Ana");
        assert_eq!(report.sent, 1);
        assert_eq!(report.corrected, 1);
        assert!(!report.aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_send_marks_error_and_continues() {
        let source = MemorySource::new(
            "Ativo",
            vec![
                row(2, "11999999999", RowStatus::Pendente, "Ana"),
                row(3, "5521988887777", RowStatus::Pendente, "Bruno"),
            ],
        );
        let (dispatcher, _trigger) = dispatcher(RecordingSender::failing_for(&["5511999999999"]));

        let report = dispatcher.run_pass(&source, &MessageTemplate::new("Oi {name}")).await;

        assert_eq!(
            source.writes(),
            vec![
                write(2, 2, "5511999999999"),
                write(2, 3, "Erro"),
                write(3, 3, "Concluído"),
            ]
        );
        assert_eq!(report.failed, 1);
        assert_eq!(report.sent, 1);
        assert_eq!(source.rows()[0].status, RowStatus::Erro);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_pending_rows_are_untouched() {
        let source = MemorySource::new(
            "Automação",
            vec![
                row(2, "(11) 99999-9999", RowStatus::Concluido, "Ana"),
                row(3, "11988887777", RowStatus::Erro, "Bruno"),
                row(4, "11977776666", RowStatus::Outro(String::new()), "Carla"),
                row(5, "11966665555", RowStatus::Outro("Aguardando".to_string()), "Davi"),
                row(6, "11955554444", RowStatus::parse(" Pendente "), "Eva"),
            ],
        );
        let (dispatcher, _trigger) = dispatcher(RecordingSender::ok());
        let start = Instant::now();

        let report = dispatcher.run_pass(&source, &MessageTemplate::new("Olá {name}")).await;

        assert!(source.writes().is_empty());
        assert!(dispatcher.sender.sent().is_empty());
        assert_eq!(report.skipped, 5);
        // Sem envio, sem pausa
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_row_without_digits_stays_pending() {
        let source = MemorySource::new(
            "Automação",
            vec![
                row(2, "", RowStatus::Pendente, "Ana"),
                row(3, "não informado", RowStatus::Pendente, "Bruno"),
            ],
        );
        let (dispatcher, _trigger) = dispatcher(RecordingSender::ok());

        let report = dispatcher.run_pass(&source, &MessageTemplate::new("Olá {name}")).await;

        assert!(source.writes().is_empty());
        assert!(dispatcher.sender.sent().is_empty());
        assert_eq!(report.invalid, 2);
        assert!(source.rows().iter().all(|r| r.status == RowStatus::Pendente));
    }

    #[tokio::test(start_paused = true)]
    async fn test_canonical_number_is_not_rewritten() {
        let source = MemorySource::new(
            "Ativo",
            vec![row(2, "5511999999999", RowStatus::Pendente, "Ana")],
        );
        let (dispatcher, _trigger) = dispatcher(RecordingSender::ok());

        dispatcher.run_pass(&source, &MessageTemplate::new("Olá {name}")).await;

        assert_eq!(source.writes(), vec![write(2, 3, "Concluído")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_canonical_number_is_still_sent() {
        let source = MemorySource::new(
            "Ativo",
            vec![row(2, "(11) 3333-4444", RowStatus::Pendente, "Ana")],
        );
        let (dispatcher, _trigger) = dispatcher(RecordingSender::ok());

        let report = dispatcher.run_pass(&source, &MessageTemplate::new("Olá {name}")).await;

        assert_eq!(
            source.writes(),
            vec![write(2, 2, "551133334444"), write(2, 3, "Concluído")]
        );
        assert_eq!(dispatcher.sender.sent()[0].number, "551133334444");
        assert_eq!(report.sent, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_only_after_successful_send() {
        let source = MemorySource::new(
            "Ativo",
            vec![
                row(2, "11999999999", RowStatus::Pendente, "Ana"),
                row(3, "11988887777", RowStatus::Pendente, "Bruno"),
                row(4, "11977776666", RowStatus::Concluido, "Carla"),
            ],
        );
        let (dispatcher, _trigger) = dispatcher(RecordingSender::failing_for(&["5511988887777"]));
        let start = Instant::now();

        dispatcher.run_pass(&source, &MessageTemplate::new("Olá {name}")).await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(180), "pausa curta demais: {:?}", elapsed);
        assert!(elapsed <= Duration::from_secs(420), "pausa longa demais: {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_failure_aborts_and_waits_retry_delay() {
        let source = MemorySource::new(
            "Automação",
            vec![row(2, "11999999999", RowStatus::Pendente, "Ana")],
        )
        .failing_reads(1);
        let (dispatcher, _trigger) = dispatcher(RecordingSender::ok());
        let start = Instant::now();

        let report = dispatcher.run_pass(&source, &MessageTemplate::new("Olá {name}")).await;

        assert!(report.aborted);
        assert_eq!(start.elapsed(), Duration::from_secs(60));
        assert!(dispatcher.sender.sent().is_empty());

        // A próxima passada lê normalmente
        let report = dispatcher.run_pass(&source, &MessageTemplate::new("Olá {name}")).await;
        assert!(!report.aborted);
        assert_eq!(report.sent, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_aborts_pass_before_sending() {
        let source = MemorySource::new(
            "Automação",
            vec![
                row(2, "(11) 99999-9999", RowStatus::Pendente, "Ana"),
                row(3, "5511988887777", RowStatus::Pendente, "Bruno"),
            ],
        )
        .failing_writes();
        let (dispatcher, _trigger) = dispatcher(RecordingSender::ok());

        let report = dispatcher.run_pass(&source, &MessageTemplate::new("Olá {name}")).await;

        assert!(report.aborted);
        // O número corrigido precisa ser gravado antes do envio
        assert!(dispatcher.sender.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_throttle_pause() {
        let source = MemorySource::new(
            "Ativo",
            vec![
                row(2, "11999999999", RowStatus::Pendente, "Ana"),
                row(3, "11988887777", RowStatus::Pendente, "Bruno"),
            ],
        );
        let (dispatcher, trigger) = dispatcher(RecordingSender::ok());
        let start = Instant::now();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            trigger.trigger();
        });

        let report = dispatcher.run_pass(&source, &MessageTemplate::new("Olá {name}")).await;

        assert!(report.cancelled);
        assert_eq!(report.sent, 1);
        assert_eq!(dispatcher.sender.sent().len(), 1);
        assert_eq!(source.rows()[1].status, RowStatus::Pendente);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_normalization_rewrites_any_status() {
        let source = MemorySource::new(
            "Automação",
            vec![
                row(2, "(11) 99999-9999", RowStatus::Concluido, "Ana"),
                row(3, "5511988887777", RowStatus::Pendente, "Bruno"),
                row(4, "", RowStatus::Pendente, "Carla"),
                row(5, "555521977776666", RowStatus::Erro, "Davi"),
            ],
        );
        let (dispatcher, _trigger) = dispatcher(RecordingSender::ok());

        let corrected = dispatcher.normalize_source_numbers(&source).await;

        assert_eq!(corrected, 2);
        assert_eq!(
            source.writes(),
            vec![write(2, 2, "5511999999999"), write(5, 2, "5521977776666")]
        );
        assert!(dispatcher.sender.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_normalization_survives_read_failure() {
        let source = MemorySource::new("Ativo", Vec::new()).failing_reads(1);
        let (dispatcher, _trigger) = dispatcher(RecordingSender::ok());

        assert_eq!(dispatcher.normalize_source_numbers(&source).await, 0);
    }
}
