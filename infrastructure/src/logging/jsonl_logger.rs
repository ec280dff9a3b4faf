//! JSONL transcript of the conversation.
//!
//! Each [`ConversationEvent`] becomes one JSON object per line with `type`,
//! `seq` and `timestamp` fields added. The file is opened in append mode so
//! several sessions accumulate in one transcript.

use dbassist_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only JSONL conversation logger.
///
/// Thread-safe via `Mutex`; every line is flushed as it is written.
pub struct JsonlConversationLogger {
    state: Mutex<LogState>,
    path: PathBuf,
}

struct LogState {
    writer: BufWriter<File>,
    seq: u64,
}

impl JsonlConversationLogger {
    /// Open (or create) the log file, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            state: Mutex::new(LogState {
                writer: BufWriter::new(file),
                seq: 0,
            }),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.seq += 1;

        let mut record = match event.payload {
            serde_json::Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        record.insert("type".to_string(), event.event_type.into());
        record.insert("seq".to_string(), state.seq.into());
        record.insert("timestamp".to_string(), timestamp.into());

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };
        if let Err(e) = writeln!(state.writer, "{}", line).and_then(|_| state.writer.flush()) {
            tracing::warn!("Could not write conversation log {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("conversation.jsonl");
        let logger = JsonlConversationLogger::open(&path).unwrap();

        logger.log(ConversationEvent::new(
            "operator_input",
            serde_json::json!({ "text": "add Bob" }),
        ));
        logger.log(ConversationEvent::new(
            "model_reply",
            serde_json::json!("CMD:LIST"),
        ));

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "operator_input");
        assert_eq!(lines[0]["text"], "add Bob");
        assert_eq!(lines[0]["seq"], 1);
        assert!(lines[0]["timestamp"].is_string());
        assert_eq!(lines[1]["data"], "CMD:LIST");
        assert_eq!(lines[1]["seq"], 2);
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.jsonl");

        for _ in 0..2 {
            let logger = JsonlConversationLogger::open(&path).unwrap();
            logger.log(ConversationEvent::new("tool_result", serde_json::json!({})));
        }

        assert_eq!(read_lines(&path).len(), 2);
    }
}
