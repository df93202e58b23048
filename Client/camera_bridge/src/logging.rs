use std::ffi::CString;
use std::sync::{Arc, Mutex, PoisonError};

use interoptopus::callback;
use interoptopus::patterns::string::AsciiPointer;
use once_cell::sync::{Lazy, OnceCell};
use tracing::field::{Field, Visit};
use tracing::{warn, Event, Level, Subscriber};
use tracing_subscriber::{layer::Context, prelude::*, registry::LookupSpan, Layer};

use crate::config::BridgeConfig;

// Callback for handing log lines to the engine's console.
callback!(DebugCallback(message: AsciiPointer, log_level: AsciiPointer));

static DEBUG_CALLBACK: Lazy<Arc<Mutex<Option<DebugCallback>>>> =
    Lazy::new(|| Arc::new(Mutex::new(None)));

static INSTALLED: OnceCell<BridgeConfig> = OnceCell::new();

pub fn set_debug_callback(callback: Option<DebugCallback>) {
    *DEBUG_CALLBACK.lock().unwrap_or_else(PoisonError::into_inner) = callback;
}

/// Logs a message to the application if a callback is registered.
fn log_to_application(message: &str, log_level: &str, location: &str) {
    let callback_guard = DEBUG_CALLBACK.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(ref callback) = *callback_guard else {
        return;
    };
    if message.is_empty() || message == "No message" {
        return;
    }
    let full_message = format!("{}\n{}", message, location);
    let (Ok(c_message), Ok(c_log_level)) = (CString::new(full_message), CString::new(log_level))
    else {
        // Interior nul byte; the engine cannot display it anyway.
        return;
    };
    callback.call(
        AsciiPointer::from_cstr(c_message.as_c_str()),
        AsciiPointer::from_cstr(c_log_level.as_c_str()),
    );
}

struct MessageVisitor {
    message: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        }
    }
}

/// Tracing layer that forwards events to the engine's debug callback.
pub struct ApplicationLoggingLayer {
    pub log_level: Level,
}

impl<S> Layer<S> for ApplicationLoggingLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event, _ctx: Context<S>) {
        let log_level = *event.metadata().level();
        // `Level` orders TRACE highest, so anything more verbose than the threshold is skipped.
        if log_level > self.log_level {
            return;
        }

        let mut visitor = MessageVisitor { message: None };
        event.record(&mut visitor);

        let message = visitor.message.unwrap_or_else(|| "No message".to_string());
        let log_level = log_level.as_str();
        let location = event.metadata().name().to_string();

        log_to_application(&message, log_level, &location);
    }
}

/// Installs the global subscriber once; later calls keep the first configuration.
pub fn init_logging(config: BridgeConfig) {
    if let Some(installed) = INSTALLED.get() {
        warn!("Logging already initialized with {:?}", installed);
        return;
    }

    let level_filter = config.log_level.level_filter();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_filter(level_filter);

    let app_layer = config.forward_to_application.then(|| {
        ApplicationLoggingLayer {
            log_level: level_filter.into_level().unwrap_or(Level::INFO),
        }
        .with_filter(level_filter)
    });

    let subscriber = tracing_subscriber::registry().with(fmt_layer).with(app_layer);

    match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => {
            let _ = INSTALLED.set(config);
        }
        Err(err) => warn!("Failed to set global subscriber: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tracing::info;

    thread_local! {
        static FORWARDED: RefCell<Vec<(String, String)>> = const { RefCell::new(Vec::new()) };
    }

    extern "C" fn record(message: AsciiPointer, log_level: AsciiPointer) {
        let message = message.as_str().unwrap_or_default().to_string();
        let log_level = log_level.as_str().unwrap_or_default().to_string();
        FORWARDED.with(|f| f.borrow_mut().push((message, log_level)));
    }

    #[test]
    fn layer_forwards_messages_at_or_above_threshold() {
        set_debug_callback(Some(DebugCallback(Some(record))));

        let subscriber = tracing_subscriber::registry().with(ApplicationLoggingLayer {
            log_level: Level::INFO,
        });
        tracing::subscriber::with_default(subscriber, || {
            info!("camera ready");
            tracing::warn!("frame dropped");
            tracing::debug!("too verbose");
        });
        set_debug_callback(None);

        FORWARDED.with(|f| {
            let forwarded = f.borrow();
            assert!(forwarded
                .iter()
                .any(|(message, level)| message.starts_with("camera ready") && level == "INFO"));
            assert!(forwarded
                .iter()
                .any(|(message, level)| message.starts_with("frame dropped") && level == "WARN"));
            assert!(!forwarded.iter().any(|(message, _)| message.starts_with("too verbose")));
        });
    }
}
