use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Delivery medium of a single request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    Web,
    Sms,
    Voice,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Sms => "sms",
            Self::Voice => "voice",
        }
    }

    /// Web renders result markup inline; every other channel needs a published link.
    pub fn renders_inline(&self) -> bool {
        matches!(self, Self::Web)
    }

    pub fn supports_share_suggestion(&self) -> bool {
        matches!(self, Self::Web)
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "web" => Ok(Self::Web),
            "sms" => Ok(Self::Sms),
            "voice" => Ok(Self::Voice),
            other => Err(DomainError::UnknownChannel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Channel;

    #[test]
    fn parses_known_channels_case_insensitively() {
        assert_eq!("SMS".parse::<Channel>(), Ok(Channel::Sms));
        assert_eq!(" voice ".parse::<Channel>(), Ok(Channel::Voice));
        assert_eq!("".parse::<Channel>(), Ok(Channel::Web));
        assert!("fax".parse::<Channel>().is_err());
    }

    #[test]
    fn only_web_renders_inline() {
        assert!(Channel::Web.renders_inline());
        assert!(!Channel::Sms.renders_inline());
        assert!(!Channel::Voice.supports_share_suggestion());
    }
}
