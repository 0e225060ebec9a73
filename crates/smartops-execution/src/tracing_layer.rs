//! Tracing layer that streams dispatch progress to a front end.
//!
//! The executor logs every step under [`DISPATCH_TARGET`] inside a `dispatch`
//! span carrying `run_id`, `index` and `tool`. This layer picks those events
//! up and forwards them, span fields included, through a tokio channel.

use crate::DISPATCH_TARGET;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// One dispatch log line, as seen by the front end.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DispatchEvent {
    pub target: String,
    /// INFO, WARN, ...
    pub level: String,
    pub message: String,
    /// Structured fields of the event itself.
    pub fields: HashMap<String, Value>,
    /// Fields of the enclosing `dispatch` span (`run_id`, `index`, `tool`).
    pub span: HashMap<String, Value>,
    pub timestamp: String,
}

impl DispatchEvent {
    pub fn span_field(&self, name: &str) -> Option<&Value> {
        self.span.get(name)
    }
}

/// Forwards events whose target starts with [`DISPATCH_TARGET`].
pub struct DispatchEventLayer {
    sender: mpsc::UnboundedSender<DispatchEvent>,
}

impl DispatchEventLayer {
    pub fn new(sender: mpsc::UnboundedSender<DispatchEvent>) -> Self {
        Self { sender }
    }

    /// Creates a layer together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DispatchEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl<S> Layer<S> for DispatchEventLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if !attrs.metadata().target().starts_with(DISPATCH_TARGET) {
            return;
        }
        let mut fields = HashMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(fields);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with(DISPATCH_TARGET) {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        let mut span_fields = HashMap::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(stored) = span.extensions().get::<HashMap<String, Value>>() {
                    span_fields.extend(stored.clone());
                }
            }
        }

        let dispatch_event = DispatchEvent {
            target: event.metadata().target().to_string(),
            level: event.metadata().level().to_string(),
            message: fields
                .remove("message")
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            fields,
            span: span_fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // A dropped receiver only means nobody is watching.
        let _ = self.sender.send(dispatch_event);
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(format!("{value:?}")));
    }
}
