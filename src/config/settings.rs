use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::models::MessageTemplate;
use crate::utils::logging::log_warning;
use crate::utils::{StartupError, StartupResult};

/// Mensagem padrão da aba "Automação"
pub const AUTOMACAO_TEMPLATE: &str = "Olá {name}, tudo bem? Percebemos que você preencheu nosso formulário para agendar sua sessão estratégica gratuita. Está tudo certo para finalizarmos o agendamento e começarmos a transformar sua estratégia de vendas?";

/// Mensagem padrão da aba "Ativo"
pub const ATIVO_TEMPLATE: &str = "Olá {name}, estamos animados em saber que você já está ativo conosco! Gostaríamos de compartilhar algumas atualizações para potencializar ainda mais sua experiência.";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub google: GoogleSettings,
    #[serde(default)]
    pub messaging: MessagingSettings,
    #[serde(default)]
    pub dispatch: DispatchSettings,
    #[serde(default = "default_campaigns")]
    pub campaigns: Vec<CampaignSettings>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GoogleSettings {
    #[serde(default)]
    pub credentials_file: String,
    #[serde(default)]
    pub sheet_id: String,
    /// Host alternativo da API Sheets (emulador); vazio usa o endpoint do Google
    #[serde(default)]
    pub sheets_base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessagingSettings {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DispatchSettings {
    /// Pausa mínima após cada envio
    #[serde(default = "default_min_delay")]
    pub min_delay_seconds: u64,
    /// Pausa máxima após cada envio
    #[serde(default = "default_max_delay")]
    pub max_delay_seconds: u64,
    /// Pausa entre ciclos completos (todas as abas)
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_seconds: u64,
    /// Pausa após falha ao acessar uma aba
    #[serde(default = "default_source_retry")]
    pub source_retry_seconds: u64,
    /// Formata todos os números antes do primeiro ciclo
    #[serde(default = "default_true")]
    pub normalize_on_startup: bool,
}

/// Aba da planilha e o texto enviado para os contatos dela
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CampaignSettings {
    pub sheet: String,
    pub template: MessageTemplate,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_min_delay() -> u64 {
    180
}

fn default_max_delay() -> u64 {
    420
}

fn default_cycle_interval() -> u64 {
    60
}

fn default_source_retry() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_campaigns() -> Vec<CampaignSettings> {
    vec![
        CampaignSettings {
            sheet: "Automação".to_string(),
            template: MessageTemplate::new(AUTOMACAO_TEMPLATE),
        },
        CampaignSettings {
            sheet: "Ativo".to_string(),
            template: MessageTemplate::new(ATIVO_TEMPLATE),
        },
    ]
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            credentials_file: String::new(),
            sheet_id: String::new(),
            sheets_base_url: None,
        }
    }
}

impl Default for MessagingSettings {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            min_delay_seconds: default_min_delay(),
            max_delay_seconds: default_max_delay(),
            cycle_interval_seconds: default_cycle_interval(),
            source_retry_seconds: default_source_retry(),
            normalize_on_startup: true,
        }
    }
}

/// Variáveis de ambiente obrigatórias e a chave de configuração que cada uma sobrescreve
const ENV_OVERRIDES: [(&str, &str); 4] = [
    ("CREDENTIALS_FILE", "google.credentials_file"),
    ("GOOGLE_SHEET_ID", "google.sheet_id"),
    ("API_URL", "messaging.api_url"),
    ("API_KEY", "messaging.api_key"),
];

impl Settings {
    /// Carrega `config/default`, `config/{RUN_MODE}`, variáveis `DISPARADOR__*`
    /// e por fim as variáveis de ambiente obrigatórias
    pub fn new() -> StartupResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("DISPARADOR").separator("__"));

        for (var, key) in ENV_OVERRIDES {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        Self::from_config(builder.build()?)
    }

    /// Desserializa e valida uma configuração já montada
    pub fn from_config(config: Config) -> StartupResult<Self> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> StartupResult<()> {
        let required = [
            ("CREDENTIALS_FILE", &self.google.credentials_file),
            ("GOOGLE_SHEET_ID", &self.google.sheet_id),
            ("API_URL", &self.messaging.api_url),
            ("API_KEY", &self.messaging.api_key),
        ];

        for (var, value) in required {
            if value.trim().is_empty() {
                return Err(StartupError::MissingSetting(var));
            }
        }

        if self.dispatch.min_delay_seconds > self.dispatch.max_delay_seconds {
            return Err(StartupError::InvalidSetting(format!(
                "dispatch.min_delay_seconds ({}) maior que dispatch.max_delay_seconds ({})",
                self.dispatch.min_delay_seconds, self.dispatch.max_delay_seconds
            )));
        }

        if self.campaigns.is_empty() {
            return Err(StartupError::InvalidSetting(
                "nenhuma campanha configurada".to_string(),
            ));
        }

        if let Some(campaign) = self.campaigns.iter().find(|c| c.sheet.trim().is_empty()) {
            return Err(StartupError::InvalidSetting(format!(
                "campanha sem nome de aba (template: {:?})",
                campaign.template.as_str()
            )));
        }

        for campaign in self.campaigns.iter().filter(|c| !c.template.has_name_slot()) {
            log_warning(&format!(
                "Template da aba '{}' não tem o campo {{name}}; todos recebem o mesmo texto",
                campaign.sheet
            ));
        }

        Ok(())
    }
}
