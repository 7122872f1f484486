//! Cliente HTTP para a API Google Sheets v4

use reqwest::{Client as HttpClient, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::ServiceAccountAuth;
use crate::error::{Result, SheetsError};
use crate::range;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// Linha da planilha indexada pelo texto do cabeçalho
pub type Record = HashMap<String, String>;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Cliente para a API Google Sheets
///
/// # Timeouts
///
/// - Total: 30s
/// - Connect: 5s
#[derive(Clone)]
pub struct SheetsClient {
    http_client: HttpClient,
    auth: Arc<ServiceAccountAuth>,
    base_url: String,
}

impl SheetsClient {
    pub fn new(auth: ServiceAccountAuth) -> Result<Self> {
        Self::with_base_url(auth, DEFAULT_BASE_URL)
    }

    /// Cria um cliente apontando para outro host (emuladores, testes)
    pub fn with_base_url(auth: ServiceAccountAuth, base_url: impl Into<String>) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            http_client,
            auth: Arc::new(auth),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Abre uma planilha pelo ID (não faz requisição)
    pub fn open_by_key(&self, spreadsheet_id: impl Into<String>) -> Spreadsheet {
        Spreadsheet {
            client: self.clone(),
            id: spreadsheet_id.into(),
        }
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!("{}/v4/spreadsheets/{}", self.base_url, spreadsheet_id)
    }

    fn values_url(&self, spreadsheet_id: &str, a1_range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(spreadsheet_id),
            urlencoding::encode(a1_range)
        )
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        tracing::debug!("GET {}", url);

        let token = self.auth.access_token().await?;
        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn put(&self, url: &str, query: &[(&str, &str)], body: &Value) -> Result<Response> {
        tracing::debug!("PUT {}", url);

        let token = self.auth.access_token().await?;
        let response = self
            .http_client
            .put(url)
            .bearer_auth(token)
            .query(query)
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Processa a resposta HTTP e trata erros
    async fn handle_response(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let error_body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

        tracing::error!("Google Sheets API error ({}): {}", status_code, error_body);

        // Formato padrão do Google: {"error": {"code": 429, "message": "...", "status": "..."}}
        let message = serde_json::from_str::<Value>(&error_body)
            .ok()
            .and_then(|json| {
                json.pointer("/error/message")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or(error_body);

        Err(SheetsError::ApiError {
            status: status_code,
            message,
        })
    }
}

/// Planilha aberta pelo ID
#[derive(Clone)]
pub struct Spreadsheet {
    client: SheetsClient,
    id: String,
}

impl Spreadsheet {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Lista os títulos das abas
    pub async fn worksheet_titles(&self) -> Result<Vec<String>> {
        let url = self.client.spreadsheet_url(&self.id);
        let response = self
            .client
            .get(&url, &[("fields", "sheets.properties.title")])
            .await?;
        let metadata: SpreadsheetMetadata = response.json().await?;

        Ok(metadata.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    /// Localiza uma aba pelo título, falhando se ela não existir
    pub async fn worksheet(&self, title: &str) -> Result<Worksheet> {
        let titles = self.worksheet_titles().await?;

        if !titles.iter().any(|t| t == title) {
            return Err(SheetsError::WorksheetNotFound(format!(
                "'{}' (abas disponíveis: {})",
                title,
                titles.join(", ")
            )));
        }

        Ok(Worksheet {
            client: self.client.clone(),
            spreadsheet_id: self.id.clone(),
            title: title.to_string(),
        })
    }
}

/// Aba de uma planilha
#[derive(Clone)]
pub struct Worksheet {
    client: SheetsClient,
    spreadsheet_id: String,
    title: String,
}

impl Worksheet {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Lê todas as linhas abaixo do cabeçalho como registros
    ///
    /// O registro de índice `i` corresponde à linha `i + 2` da planilha. Linhas
    /// vazias no meio da aba são mantidas (com valores vazios) para não deslocar
    /// os índices; células ausentes no fim da linha viram string vazia.
    pub async fn get_all_records(&self) -> Result<Vec<Record>> {
        let url = self
            .client
            .values_url(&self.spreadsheet_id, &range::sheet_range(&self.title));
        let response = self
            .client
            .get(&url, &[("valueRenderOption", "FORMATTED_VALUE"), ("majorDimension", "ROWS")])
            .await?;
        let value_range: ValueRange = response.json().await?;

        Ok(records_from_values(value_range.values))
    }

    /// Atualiza uma célula (linha e coluna 1-based)
    pub async fn update_cell(&self, row: u32, column: u32, value: &str) -> Result<()> {
        let a1 = range::cell_range(&self.title, row, column)?;
        let url = self.client.values_url(&self.spreadsheet_id, &a1);
        let body = json!({
            "range": &a1,
            "majorDimension": "ROWS",
            "values": [[value]]
        });

        self.client
            .put(&url, &[("valueInputOption", "RAW")], &body)
            .await?;

        tracing::debug!("Célula {} atualizada para '{}'", a1, value);
        Ok(())
    }
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn records_from_values(mut rows: Vec<Vec<Value>>) -> Vec<Record> {
    if rows.is_empty() {
        return Vec::new();
    }

    let headers: Vec<String> = rows.remove(0).iter().map(cell_to_string).collect();

    rows.into_iter()
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(col, header)| {
                    let value = row.get(col).map(cell_to_string).unwrap_or_default();
                    (header.clone(), value)
                })
                .collect()
        })
        .collect()
}
