//! Module `invocation`
//!
//! Records of handler invocations for test introspection. Each handler
//! keeps an append-only log; appends are serialized so concurrent sessions
//! sharing a handler never interleave or lose records.

use std::collections::HashMap;
use std::sync::Mutex;

/// Well-known record keys.
pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";
pub const PATHNAME_KEY: &str = "pathname";
pub const FILE_CONTENTS_KEY: &str = "filecontents";
pub const HOST_KEY: &str = "host";
pub const PORT_KEY: &str = "port";

#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Text(String),
    Bytes(Vec<u8>),
}

/// The parameters and effects captured from one handler invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRecord {
    command_name: String,
    data: HashMap<String, RecordValue>,
}

impl InvocationRecord {
    pub fn new(command_name: &str) -> Self {
        Self {
            command_name: command_name.to_string(),
            data: HashMap::new(),
        }
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn set_text(&mut self, key: &str, value: &str) {
        self.data
            .insert(key.to_string(), RecordValue::Text(value.to_string()));
    }

    pub fn set_bytes(&mut self, key: &str, value: Vec<u8>) {
        self.data.insert(key.to_string(), RecordValue::Bytes(value));
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.data.get(key) {
            Some(RecordValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn bytes(&self, key: &str) -> Option<&[u8]> {
        match self.data.get(key) {
            Some(RecordValue::Bytes(value)) => Some(value),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Ordered, append-only log of a handler's invocations.
#[derive(Debug, Default)]
pub struct InvocationLog {
    records: Mutex<Vec<InvocationRecord>>,
}

impl InvocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: InvocationRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<InvocationRecord> {
        self.records.lock().unwrap().get(index).cloned()
    }

    pub fn last(&self) -> Option<InvocationRecord> {
        self.records.lock().unwrap().last().cloned()
    }

    /// Empties the log between test scenarios. Never called mid-session by
    /// the server itself.
    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_text_and_bytes() {
        let mut record = InvocationRecord::new("STOR");
        record.set_text(PATHNAME_KEY, "file.txt");
        record.set_bytes(FILE_CONTENTS_KEY, vec![0x61, 0x62]);

        assert_eq!(record.command_name(), "STOR");
        assert_eq!(record.text(PATHNAME_KEY), Some("file.txt"));
        assert_eq!(record.bytes(FILE_CONTENTS_KEY), Some(&[0x61, 0x62][..]));
        assert_eq!(record.text(FILE_CONTENTS_KEY), None);
        assert!(!record.contains_key(USERNAME_KEY));
    }

    #[test]
    fn test_log_preserves_order() {
        let log = InvocationLog::new();
        log.append(InvocationRecord::new("USER"));
        log.append(InvocationRecord::new("PASS"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.get(0).unwrap().command_name(), "USER");
        assert_eq!(log.get(1).unwrap().command_name(), "PASS");
        assert_eq!(log.last().unwrap().command_name(), "PASS");
    }

    #[test]
    fn test_clear() {
        let log = InvocationLog::new();
        log.append(InvocationRecord::new("NOOP"));
        log.clear();
        assert!(log.is_empty());
    }
}
