//! Bridge from `tracing` events to a [`Core`].
//!
//! Span fields are accumulated with [`Core::with`] when the span is created and the derived core is
//! kept in the span's extensions, so events inside the span inherit them the same way a logger
//! built with `with(fields)` would.

use super::{CheckedEntry, Core};
use crate::domain::{Caller, Entry, Field, FieldValue, Level};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field as TracingField, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Field name that overrides the façade level of an event, e.g. `severity = "fatal"`.
pub const SEVERITY_FIELD: &str = "severity";

/// Targets whose events never reach the core. Reporting these would feed the reporter's own
/// traffic back into it.
pub const DEFAULT_EXCLUDED_TARGETS: &[&str] = &[
    "rask_rollbar::rollbar",
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "rustls",
];

struct SpanCore(Box<dyn Core>);

pub struct CoreLayer {
    core: Arc<dyn Core>,
    excluded_targets: Vec<String>,
}

impl CoreLayer {
    pub fn new(core: Arc<dyn Core>) -> Self {
        Self {
            core,
            excluded_targets: DEFAULT_EXCLUDED_TARGETS
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
        }
    }

    /// Adds a target prefix whose events are ignored.
    pub fn exclude_target(mut self, target: impl Into<String>) -> Self {
        self.excluded_targets.push(target.into());
        self
    }

    pub fn core(&self) -> &Arc<dyn Core> {
        &self.core
    }

    fn is_excluded(&self, target: &str) -> bool {
        self.excluded_targets.iter().any(|excluded| {
            target == excluded
                || target
                    .strip_prefix(excluded.as_str())
                    .is_some_and(|rest| rest.starts_with("::"))
        })
    }
}

impl<S> Layer<S> for CoreLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        if visitor.fields.is_empty() {
            return;
        }

        let derived = span
            .scope()
            .skip(1)
            .find_map(|ancestor| {
                let extensions = ancestor.extensions();
                extensions
                    .get::<SpanCore>()
                    .map(|parent| parent.0.with(&visitor.fields))
            })
            .unwrap_or_else(|| self.core.with(&visitor.fields));

        span.extensions_mut().insert(SpanCore(derived));
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if self.is_excluded(metadata.target()) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut entry = Entry::new(
            visitor.severity.unwrap_or_else(|| Level::from(*metadata.level())),
            visitor.message.take().unwrap_or_default(),
        )
        .with_time(Utc::now())
        .with_logger_name(metadata.target());
        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            entry = entry.with_caller(Caller::new(file, line));
        }

        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                let extensions = span.extensions();
                if let Some(span_core) = extensions.get::<SpanCore>() {
                    dispatch(span_core.0.as_ref(), &entry, &visitor.fields);
                    return;
                }
            }
        }
        dispatch(self.core.as_ref(), &entry, &visitor.fields);
    }
}

fn dispatch(core: &dyn Core, entry: &Entry, fields: &[Field]) {
    let checked = core.check(entry, CheckedEntry::new());
    if checked.is_empty() {
        return;
    }
    if let Err(e) = checked.write(fields) {
        eprintln!("{} write error: {}", Utc::now().to_rfc3339(), e);
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    severity: Option<Level>,
    fields: Vec<Field>,
}

impl FieldVisitor {
    fn push(&mut self, field: &TracingField, value: FieldValue) {
        self.fields.push(Field::new(field.name(), value));
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &TracingField, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, FieldValue::String(format!("{:?}", value)));
        }
    }

    fn record_str(&mut self, field: &TracingField, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            SEVERITY_FIELD => match value.parse::<Level>() {
                Ok(level) => self.severity = Some(level),
                Err(_) => self.push(field, FieldValue::String(value.to_string())),
            },
            _ => self.push(field, FieldValue::String(value.to_string())),
        }
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.push(field, FieldValue::I64(value));
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.push(field, FieldValue::U64(value));
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.push(field, FieldValue::F64(value));
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.push(field, FieldValue::Bool(value));
    }

    fn record_error(
        &mut self,
        field: &TracingField,
        value: &(dyn std::error::Error + 'static),
    ) {
        self.push(field, FieldValue::Error(value.to_string()));
    }
}
