//! Test data builders for creating test messages

use gauge_trace::MessageEvent;
use serde_json::{json, Map, Value};

/// Builder for nested test messages and their events
pub struct MessageBuilder {
    topic: String,
    body: Value,
}

impl MessageBuilder {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            body: Value::Object(Map::new()),
        }
    }

    /// Set a (possibly dotted) field, creating intermediate objects
    pub fn field(mut self, path: &str, value: Value) -> Self {
        let mut current = &mut self.body;
        let segments: Vec<&str> = path.split('.').collect();
        for (i, segment) in segments.iter().enumerate() {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            let obj = current.as_object_mut().expect("object ensured above");
            if i + 1 == segments.len() {
                obj.insert(segment.to_string(), value);
                break;
            }
            current = obj.entry(segment.to_string()).or_insert_with(|| json!({}));
        }
        self
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn at(self, receive_time_ms: i64) -> MessageEvent {
        MessageEvent::new(self.topic, receive_time_ms, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builder() {
        let event = MessageBuilder::new("/odom")
            .field("twist.linear.x", json!(1.5))
            .field("twist.linear.y", json!(-0.5))
            .field("frame_id", json!("base"))
            .at(2500);

        assert_eq!(event.topic, "/odom");
        assert_eq!(event.timestamp_ms(), 2500);
        assert_eq!(event.message["twist"]["linear"]["x"], json!(1.5));
        assert_eq!(event.message["twist"]["linear"]["y"], json!(-0.5));
        assert_eq!(event.message["frame_id"], json!("base"));
    }
}
