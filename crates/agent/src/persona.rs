use wren_core::config::AgentConfig;

/// How the agent names itself and its makers in replies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Persona {
    /// Lowercase token used in artifact names and matched when users address the agent.
    pub name: String,
    pub display_name: String,
    pub maker: String,
    pub maker_url: String,
}

impl Persona {
    pub fn from_config(config: &AgentConfig) -> Self {
        let name = config.name.trim().to_lowercase();
        Self {
            display_name: capitalize(&name),
            name,
            maker: config.maker.clone(),
            maker_url: config.maker_url.clone(),
        }
    }

    /// "<Name> just <did> for me. Ask <Name> anything!"
    pub fn share_text(&self, did: &str) -> String {
        format!("{name} just {did} for me. Ask {name} anything!", name = self.display_name)
    }
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut characters = word.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}
