use crate::domain::{ChatId, MessageId};

/// What kind of content an inbound message carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageShape {
    /// Plain text message.
    PlainText,
    /// Photo, video, document, audio, animation or voice: accepts a caption.
    CaptionedMedia,
    /// Stickers, polls, locations, service messages and the like.
    OtherMedia,
}

impl MessageShape {
    pub fn supports_caption(self) -> bool {
        matches!(self, MessageShape::CaptionedMedia)
    }
}

/// Cross-messenger inbound message.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub shape: MessageShape,
}

impl InboundMessage {
    /// `text`, else `caption`, else empty. Empty strings count as missing.
    pub fn body(&self) -> &str {
        self.text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.caption.as_deref().filter(|c| !c.is_empty()))
            .unwrap_or("")
    }
}

/// A `/command args` message after parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: String,
}

impl Command {
    /// Parse `/cmd@botname arg1 ...`. Returns `None` for non-command text.
    ///
    /// `args` is everything after the first whitespace character, untrimmed.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_start();
        if !text.starts_with('/') {
            return None;
        }

        let mut parts = text.splitn(2, char::is_whitespace);
        let first = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("").to_string();

        let name = first
            .trim_start_matches('/')
            .split('@')
            .next()
            .unwrap_or("")
            .to_lowercase();
        if name.is_empty() {
            return None;
        }

        Some(Self { name, args: rest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: Option<&str>, caption: Option<&str>) -> InboundMessage {
        InboundMessage {
            id: MessageId(1),
            chat_id: ChatId(1),
            text: text.map(str::to_string),
            caption: caption.map(str::to_string),
            shape: MessageShape::PlainText,
        }
    }

    #[test]
    fn body_prefers_text_then_caption() {
        assert_eq!(msg(Some("t"), Some("c")).body(), "t");
        assert_eq!(msg(None, Some("c")).body(), "c");
        assert_eq!(msg(None, None).body(), "");
    }

    #[test]
    fn empty_text_falls_through_to_caption() {
        assert_eq!(msg(Some(""), Some("hi")).body(), "hi");
        assert_eq!(msg(Some(""), Some("")).body(), "");
        assert_eq!(msg(None, Some("")).body(), "");
    }

    #[test]
    fn parses_commands_with_bot_suffix() {
        let c = Command::parse("/AddReplace@relay_bot  old new text ").unwrap();
        assert_eq!(c.name, "addreplace");
        assert_eq!(c.args, " old new text ");

        let c = Command::parse("/block").unwrap();
        assert_eq!(c.name, "block");
        assert_eq!(c.args, "");

        let c = Command::parse("/addreplace foo  bar ").unwrap();
        assert_eq!(c.args, "foo  bar ");
    }

    #[test]
    fn non_commands_are_rejected() {
        assert_eq!(Command::parse("hello /block 1"), None);
        assert_eq!(Command::parse("/"), None);
        assert_eq!(Command::parse(""), None);
    }
}
