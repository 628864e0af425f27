use super::level::RollbarLevel;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

const NOTIFIER_NAME: &str = "rask-rollbar";

/// Static metadata bound to every item a client sends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMetadata {
    pub token: String,
    pub environment: String,
    pub code_version: String,
    pub server_host: String,
    pub server_root: String,
}

impl ClientMetadata {
    pub fn new(
        token: impl Into<String>,
        environment: impl Into<String>,
        code_version: impl Into<String>,
        server_host: impl Into<String>,
        server_root: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            environment: environment.into(),
            code_version: code_version.into(),
            server_host: server_host.into(),
            server_root: server_root.into(),
        }
    }
}

/// One request body for the Rollbar item API.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub access_token: String,
    pub data: Data,
}

#[derive(Debug, Clone, Serialize)]
pub struct Data {
    pub environment: String,
    pub body: Body,
    pub level: RollbarLevel,
    pub timestamp: i64,
    pub platform: &'static str,
    pub language: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_version: Option<String>,
    pub server: Server,
    pub notifier: Notifier,
    pub uuid: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Body {
    pub message: Message,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Server {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notifier {
    pub name: &'static str,
    pub version: &'static str,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl Item {
    pub fn message(
        access_token: String,
        metadata: &ClientMetadata,
        level: RollbarLevel,
        text: &str,
    ) -> Self {
        Self {
            access_token,
            data: Data {
                environment: metadata.environment.clone(),
                body: Body {
                    message: Message {
                        body: text.to_string(),
                    },
                },
                level,
                timestamp: Utc::now().timestamp(),
                platform: std::env::consts::OS,
                language: "rust",
                code_version: non_empty(&metadata.code_version),
                server: Server {
                    host: non_empty(&metadata.server_host),
                    root: non_empty(&metadata.server_root),
                },
                notifier: Notifier {
                    name: NOTIFIER_NAME,
                    version: crate::VERSION,
                },
                uuid: Uuid::new_v4().to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_item_json_shape() {
        let metadata = ClientMetadata::new("tok", "production", "abc123", "web-1", "/srv/app");
        let item = Item::message("tok".into(), &metadata, RollbarLevel::Warning, "disk full");
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["access_token"], "tok");
        assert_eq!(json["data"]["environment"], "production");
        assert_eq!(json["data"]["level"], "warning");
        assert_eq!(json["data"]["body"]["message"]["body"], "disk full");
        assert_eq!(json["data"]["code_version"], "abc123");
        assert_eq!(json["data"]["server"]["host"], "web-1");
        assert_eq!(json["data"]["server"]["root"], "/srv/app");
        assert_eq!(json["data"]["language"], "rust");
        assert_eq!(json["data"]["notifier"]["name"], "rask-rollbar");
        assert_eq!(json["data"]["uuid"].as_str().unwrap().len(), 36);
    }

    #[test]
    fn test_empty_metadata_is_omitted() {
        let metadata = ClientMetadata::new("tok", "staging", "", "", "");
        let item = Item::message("tok".into(), &metadata, RollbarLevel::Error, "oops");
        let json = serde_json::to_value(&item).unwrap();

        assert!(json["data"].get("code_version").is_none());
        assert_eq!(json["data"]["server"], serde_json::json!({}));
    }

    #[test]
    fn test_each_item_gets_a_fresh_uuid() {
        let metadata = ClientMetadata::default();
        let a = Item::message(String::new(), &metadata, RollbarLevel::Info, "a");
        let b = Item::message(String::new(), &metadata, RollbarLevel::Info, "a");
        assert_ne!(a.data.uuid, b.data.uuid);
    }
}
