use std::sync::Arc;

use teloxide::prelude::*;

use relay_core::{
    domain::{ChatId, MessageId},
    messaging::types::{InboundMessage, MessageShape},
    relay::RelayOutcome,
};

use crate::router::AppState;

pub async fn handle_relay(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let inbound = to_inbound(&msg);

    match state.pipeline.relay(&inbound).await {
        Ok(RelayOutcome::Sent(r)) | Ok(RelayOutcome::Copied(r)) => {
            tracing::debug!(
                message_id = %inbound.id,
                target_message_id = %r.message_id,
                "dispatched"
            );
        }
        Ok(RelayOutcome::Dropped) | Ok(RelayOutcome::Ignored) => {}
        // Not retried: the message is lost for this run.
        Err(e) => tracing::error!(message_id = %inbound.id, "relay failed: {e}"),
    }

    Ok(())
}

fn to_inbound(msg: &Message) -> InboundMessage {
    InboundMessage {
        id: MessageId(msg.id.0),
        chat_id: ChatId(msg.chat.id.0),
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        shape: shape_of(msg),
    }
}

fn shape_of(msg: &Message) -> MessageShape {
    if msg.text().is_some() {
        return MessageShape::PlainText;
    }

    let captionable = msg.photo().is_some()
        || msg.video().is_some()
        || msg.document().is_some()
        || msg.audio().is_some()
        || msg.animation().is_some()
        || msg.voice().is_some();

    if captionable {
        MessageShape::CaptionedMedia
    } else {
        MessageShape::OtherMedia
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(extra: serde_json::Value) -> Message {
        let mut v = json!({
            "message_id": 42,
            "date": 1_700_000_000,
            "chat": { "id": -1001, "type": "channel", "title": "source" }
        });
        for (k, val) in extra.as_object().unwrap() {
            v[k] = val.clone();
        }
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn text_post_is_plain_text() {
        let m = to_inbound(&parse(json!({ "text": "hello t.me/old" })));
        assert_eq!(m.id, MessageId(42));
        assert_eq!(m.chat_id, ChatId(-1001));
        assert_eq!(m.text.as_deref(), Some("hello t.me/old"));
        assert_eq!(m.shape, MessageShape::PlainText);
    }

    #[test]
    fn photo_with_caption_is_captioned_media() {
        let m = to_inbound(&parse(json!({
            "photo": [{
                "file_id": "f",
                "file_unique_id": "u",
                "width": 10,
                "height": 10,
                "file_size": 100
            }],
            "caption": "look"
        })));
        assert_eq!(m.text, None);
        assert_eq!(m.caption.as_deref(), Some("look"));
        assert_eq!(m.shape, MessageShape::CaptionedMedia);
    }

    #[test]
    fn location_is_other_media() {
        let m = to_inbound(&parse(json!({
            "location": { "longitude": 30.5, "latitude": 50.4 }
        })));
        assert_eq!(m.body(), "");
        assert_eq!(m.shape, MessageShape::OtherMedia);
    }
}
