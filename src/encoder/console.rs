use super::{EncodeError, Encoder};
use crate::domain::{Entry, Field};
use bytes::{BufMut, BytesMut};
use chrono::SecondsFormat;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// Seconds since the Unix epoch with microsecond precision.
    EpochSeconds,
    Rfc3339,
    Omit,
}

#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub time_format: TimeFormat,
    pub include_caller: bool,
    pub include_stacktrace: bool,
    pub line_ending: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::EpochSeconds,
            include_caller: true,
            include_stacktrace: true,
            line_ending: "\n".to_string(),
        }
    }
}

/// Human-readable, tab-separated encoder.
///
/// Layout: `time  level  logger  caller  message  {context}`, each element separated by a tab and
/// empty elements skipped. Context fields are rendered as one JSON object in insertion order, with
/// accumulated fields first. A non-empty stacktrace follows on its own line.
#[derive(Debug, Clone, Default)]
pub struct ConsoleEncoder {
    config: EncoderConfig,
    context: Vec<(String, Value)>,
}

impl ConsoleEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            context: Vec::new(),
        }
    }

    pub fn context_len(&self) -> usize {
        self.context.len()
    }

    fn write_time(&self, entry: &Entry, elements: &mut Vec<String>) {
        match self.config.time_format {
            TimeFormat::EpochSeconds => elements.push(format!(
                "{}.{:06}",
                entry.time.timestamp(),
                entry.time.timestamp_subsec_micros()
            )),
            TimeFormat::Rfc3339 => {
                elements.push(entry.time.to_rfc3339_opts(SecondsFormat::Millis, true));
            }
            TimeFormat::Omit => {}
        }
    }

    fn write_context(
        &self,
        fields: &[Field],
        buf: &mut BytesMut,
    ) -> Result<(), EncodeError> {
        let mut call_site = Vec::with_capacity(fields.len());
        for field in fields {
            let value = field.value.to_json().map_err(|reason| EncodeError::Field {
                key: field.key.clone(),
                reason,
            })?;
            call_site.push((field.key.as_str(), value));
        }

        let pairs = self
            .context
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .chain(call_site.iter().map(|(k, v)| (*k, v)));

        buf.put_u8(b'{');
        for (i, (key, value)) in pairs.enumerate() {
            if i > 0 {
                buf.put_u8(b',');
            }
            buf.put_slice(serde_json::to_string(key)?.as_bytes());
            buf.put_u8(b':');
            buf.put_slice(serde_json::to_string(value)?.as_bytes());
        }
        buf.put_u8(b'}');
        Ok(())
    }
}

impl Encoder for ConsoleEncoder {
    fn add_field(&mut self, field: Field) {
        let value = match field.value.to_json() {
            Ok(value) => value,
            Err(reason) => Value::String(reason),
        };
        self.context.push((field.key, value));
    }

    fn clone_encoder(&self) -> Box<dyn Encoder> {
        Box::new(self.clone())
    }

    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<BytesMut, EncodeError> {
        let mut elements = Vec::with_capacity(5);
        self.write_time(entry, &mut elements);
        elements.push(entry.level.as_str().to_string());
        if !entry.logger_name.is_empty() {
            elements.push(entry.logger_name.clone());
        }
        if self.config.include_caller
            && let Some(caller) = &entry.caller
        {
            elements.push(caller.trimmed_path());
        }
        elements.push(entry.message.clone());

        let mut buf = BytesMut::with_capacity(256);
        buf.put_slice(elements.join("\t").as_bytes());

        if !self.context.is_empty() || !fields.is_empty() {
            buf.put_u8(b'\t');
            self.write_context(fields, &mut buf)?;
        }
        buf.put_slice(self.config.line_ending.as_bytes());

        if self.config.include_stacktrace && !entry.stack.is_empty() {
            buf.put_slice(entry.stack.as_bytes());
            buf.put_slice(self.config.line_ending.as_bytes());
        }

        Ok(buf)
    }
}
