//! Chat-widget "messages" rendering of a transcript snapshot.

use serde_json::{Value, json};

use crate::content::{ContentBlock, TranscriptSnapshot, Turn};
use crate::media::mime_type;

/// Renders every turn as `{"role": ..., "content": ...}`.
///
/// A turn holding a single text block renders its content as a plain string;
/// anything else renders a list of `{"type":"text","text":..}` and
/// `{"path":..,"mime_type":..}` items. Zero-block turns render an empty list.
pub fn to_chat_messages(snapshot: &TranscriptSnapshot) -> Value {
    Value::Array(snapshot.turns.iter().map(render_turn).collect())
}

pub fn render_turn(turn: &Turn) -> Value {
    let content = match turn.content.as_slice() {
        [ContentBlock::Text { value }] => Value::String(value.clone()),
        blocks => Value::Array(blocks.iter().map(render_block).collect()),
    };
    json!({ "role": turn.role.as_str(), "content": content })
}

fn render_block(block: &ContentBlock) -> Value {
    match block {
        ContentBlock::Text { value } => json!({ "type": "text", "text": value }),
        ContentBlock::ErrorNote { message } => json!({ "type": "text", "text": message }),
        ContentBlock::ImageRef { path_or_url } => json!({
            "path": path_or_url,
            "mime_type": mime_type(path_or_url).unwrap_or("image/png"),
        }),
        ContentBlock::VideoRef { path_or_url } => json!({
            "path": path_or_url,
            "mime_type": mime_type(path_or_url).unwrap_or("video/mp4"),
        }),
    }
}
