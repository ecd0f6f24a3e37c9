//! Trigger event types
//!
//! Object storage delivers one notification per created object; only the
//! bucket and key matter to the pipeline.

use serde::{Deserialize, Serialize};

/// The unit of work: one newly created object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCreatedEvent {
    pub bucket: String,
    pub key: String,
}

/// S3-style event notification envelope
#[derive(Debug, Clone, Deserialize)]
pub struct EventNotification {
    #[serde(rename = "Records")]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRef {
    pub key: String,
}

impl EventNotification {
    /// One event per record, in delivery order
    pub fn object_events(&self) -> Vec<ObjectCreatedEvent> {
        self.records
            .iter()
            .map(|record| ObjectCreatedEvent {
                bucket: record.s3.bucket.name.clone(),
                key: record.s3.object.key.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_storage_notification() {
        let raw = r#"{
            "Records": [
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": { "name": "medical-scans", "arn": "arn:aws:s3:::medical-scans" },
                        "object": { "key": "incoming/x_ray.jpg", "size": 204800 }
                    }
                }
            ]
        }"#;

        let notification: EventNotification = serde_json::from_str(raw).unwrap();
        let events = notification.object_events();

        assert_eq!(
            events,
            vec![ObjectCreatedEvent {
                bucket: "medical-scans".to_string(),
                key: "incoming/x_ray.jpg".to_string(),
            }]
        );
    }

    #[test]
    fn test_multiple_records_keep_delivery_order() {
        let raw = r#"{
            "Records": [
                { "s3": { "bucket": { "name": "b" }, "object": { "key": "incoming/a.png" } } },
                { "s3": { "bucket": { "name": "b" }, "object": { "key": "incoming/b.png" } } }
            ]
        }"#;

        let notification: EventNotification = serde_json::from_str(raw).unwrap();
        let keys: Vec<String> = notification
            .object_events()
            .into_iter()
            .map(|e| e.key)
            .collect();

        assert_eq!(keys, vec!["incoming/a.png", "incoming/b.png"]);
    }
}
