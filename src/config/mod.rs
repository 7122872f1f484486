pub mod settings;

pub use settings::{CampaignSettings, DispatchSettings, GoogleSettings, MessagingSettings, Settings};
