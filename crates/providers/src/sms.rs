//! Outbound text messages through the Twilio REST API.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;
use wren_agent::adapters::SmsSender;
use wren_core::config::SmsConfig;
use wren_core::errors::ProviderError;

use crate::http::send;

const PROVIDER: &str = "twilio";
const API_BASE: &str = "https://api.twilio.com/2010-04-01";

pub struct TwilioSms {
    client: Client,
    configured: bool,
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
}

impl TwilioSms {
    pub fn new(client: Client, config: &SmsConfig) -> Self {
        Self {
            client,
            configured: config.is_configured(),
            account_sid: config.account_sid.trim().to_string(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.trim().to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{API_BASE}/Accounts/{}/Messages.json", self.account_sid)
    }
}

#[async_trait]
impl SmsSender for TwilioSms {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send_message(&self, to: &str, body: &str) -> Result<(), ProviderError> {
        if !self.configured {
            return Err(ProviderError::Unsupported {
                provider: PROVIDER.to_string(),
                operation: "send_message".to_string(),
            });
        }
        let request = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)]);
        send(PROVIDER, request).await?;
        info!(event_name = "providers.sms.sent", chars = body.chars().count(), "text message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use secrecy::SecretString;
    use wren_agent::adapters::SmsSender;
    use wren_core::config::SmsConfig;
    use wren_core::errors::ProviderError;

    use super::TwilioSms;

    fn sms(enabled: bool) -> TwilioSms {
        let config = SmsConfig {
            enabled,
            account_sid: " AC123 ".to_string(),
            auth_token: SecretString::from("token".to_string()),
            from_number: "+15550100".to_string(),
        };
        TwilioSms::new(Client::new(), &config)
    }

    #[test]
    fn messages_post_to_the_account_resource() {
        assert_eq!(sms(true).messages_url(), "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json");
    }

    #[tokio::test]
    async fn disabled_sender_refuses_without_a_request() {
        let result = sms(false).send_message("+15550199", "hello").await;
        assert!(matches!(result, Err(ProviderError::Unsupported { .. })));
    }
}
