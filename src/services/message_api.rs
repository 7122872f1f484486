use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::models::OutboundMessage;
use crate::utils::logging::*;
use crate::utils::{DispatchError, DispatchResult, StartupResult};

/// Envio de uma mensagem para um número canônico
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Retorna o corpo da resposta em caso de sucesso (2xx)
    async fn send(&self, message: &OutboundMessage) -> DispatchResult<String>;
}

/// Cliente da API HTTP de mensagens (WhatsApp)
///
/// `POST {api_url}` com corpo `{"number": ..., "text": ...}` e a chave no
/// header `apikey`.
#[derive(Clone)]
pub struct MessageApiService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl MessageApiService {
    pub fn new(api_url: String, api_key: String, timeout_seconds: u64) -> StartupResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl MessageSender for MessageApiService {
    async fn send(&self, message: &OutboundMessage) -> DispatchResult<String> {
        tracing::debug!("POST {} para {}", self.api_url, message.number);

        let response = self
            .client
            .post(&self.api_url)
            .header("apikey", &self.api_key)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await.unwrap_or_default();

        if status.is_success() {
            Ok(response_text)
        } else {
            log_error(&format!(
                "Failed to send message. Status: {}, Response: {}",
                status, response_text
            ));
            Err(DispatchError::SendRejected {
                status: status.as_u16(),
                body: response_text,
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Remetente em memória: registra as mensagens e responde conforme o roteiro
    pub(crate) struct RecordingSender {
        sent: Mutex<Vec<OutboundMessage>>,
        fail_numbers: Vec<String>,
    }

    impl RecordingSender {
        pub(crate) fn ok() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_numbers: Vec::new(),
            }
        }

        pub(crate) fn failing_for(numbers: &[&str]) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_numbers: numbers.iter().map(|n| n.to_string()).collect(),
            }
        }

        pub(crate) fn sent(&self) -> Vec<OutboundMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, message: &OutboundMessage) -> DispatchResult<String> {
            self.sent.lock().unwrap().push(message.clone());
            if self.fail_numbers.contains(&message.number) {
                Err(DispatchError::SendRejected {
                    status: 500,
                    body: "instance disconnected".to_string(),
                })
            } else {
                Ok(r#"{"status":"PENDING"}"#.to_string())
            }
        }
    }

    fn message() -> OutboundMessage {
        OutboundMessage {
            number: "5511999999999".to_string(),
            text: "Olá Ana".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_json_with_apikey() {
        let server = MockServer::start_async().await;
        let send_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/message/sendText/instancia")
                    .header("apikey", "segredo")
                    .header("content-type", "application/json")
                    .json_body(json!({"number": "5511999999999", "text": "Olá Ana"}));
                then.status(201).body(r#"{"key":{"id":"ABC"},"status":"PENDING"}"#);
            })
            .await;

        let service = MessageApiService::new(
            server.url("/message/sendText/instancia"),
            "segredo".to_string(),
            5,
        )
        .unwrap();

        let body = service.send(&message()).await.unwrap();
        send_mock.assert_async().await;
        assert!(body.contains("PENDING"));
    }

    #[tokio::test]
    async fn test_non_2xx_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/send");
                then.status(400).body(r#"{"error":"number not on WhatsApp"}"#);
            })
            .await;

        let service = MessageApiService::new(server.url("/send"), "segredo".to_string(), 5).unwrap();
        let err = service.send(&message()).await.unwrap_err();

        assert!(matches!(
            err,
            DispatchError::SendRejected { status: 400, ref body } if body.contains("not on WhatsApp")
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_send_error() {
        // Porta fechada: falha de conexão
        let service = MessageApiService::new("http://127.0.0.1:9/send".to_string(), "segredo".to_string(), 2).unwrap();
        let err = service.send(&message()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Send(_)));
    }
}
