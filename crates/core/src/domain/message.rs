use serde::{Deserialize, Serialize};

/// One outgoing line of a reply.
///
/// `Raw` is reserved for markup generated by this application; anything that
/// originated with a user or a third party goes through `Escaped`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Escaped(String),
    Raw(String),
}

impl Message {
    pub fn to_wire(&self) -> String {
        match self {
            Self::Escaped(text) => escape_markup(text),
            Self::Raw(markup) => markup.clone(),
        }
    }
}

/// Final result of one request: ordered messages plus an optional share text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub messages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_suggestion: Option<String>,
}

impl Reply {
    pub fn primary(&self) -> Option<&str> {
        self.messages.first().map(String::as_str)
    }
}

pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Reverses [`escape_markup`], for channels that deliver plain text.
pub fn unescape_markup(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::{escape_markup, unescape_markup, Message, Reply};

    #[test]
    fn escaped_messages_neutralize_markup() {
        let message = Message::Escaped("<b>Tom & Jerry's</b>".to_string());
        assert_eq!(message.to_wire(), "&lt;b&gt;Tom &amp; Jerry&#039;s&lt;/b&gt;");
    }

    #[test]
    fn raw_messages_pass_through() {
        let message = Message::Raw("<p>ok</p>".to_string());
        assert_eq!(message.to_wire(), "<p>ok</p>");
    }

    #[test]
    fn reply_serializes_share_suggestion_in_camel_case() {
        let reply = Reply {
            messages: vec!["hi".to_string()],
            share_suggestion: Some("share".to_string()),
        };
        let json = serde_json::to_value(&reply).expect("serialize");
        assert_eq!(json["shareSuggestion"], "share");
        assert_eq!(reply.primary(), Some("hi"));
        assert_eq!(escape_markup("plain"), "plain");
    }

    #[test]
    fn unescape_restores_plain_text() {
        let original = "Tom & Jerry's \"<b>\" &lt;";
        assert_eq!(unescape_markup(&escape_markup(original)), original);
    }
}
