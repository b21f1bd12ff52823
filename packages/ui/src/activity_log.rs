//! Timestamped record of what happened in the workspace: save results,
//! load failures, flash messages from the server, class listings.
//!
//! [`StatusBar`] shows the newest entry and expands into the full history.

use dioxus::prelude::*;

const ACTIVITY_LOG_CSS: Asset = asset!("/assets/styling/activity_log.css");

/// Entries kept before the oldest are dropped.
const MAX_ENTRIES: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

impl LogLevel {
    fn css_class(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct ActivityLog {
    pub entries: Vec<LogEntry>,
    pub expanded: bool,
}

impl ActivityLog {
    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        if self.entries.len() == MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push(LogEntry {
            timestamp: current_time(),
            level,
            message: message.into(),
        });
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.last()
    }
}

pub fn use_activity_log() -> Signal<ActivityLog> {
    use_context::<Signal<ActivityLog>>()
}

/// Provide an empty activity log to the children.
#[component]
pub fn ActivityLogProvider(children: Element) -> Element {
    use_context_provider(|| Signal::new(ActivityLog::default()));
    rsx! {
        {children}
    }
}

pub fn log_activity(log: &mut Signal<ActivityLog>, level: LogLevel, message: &str) {
    match level {
        LogLevel::Error => tracing::warn!("{}", message),
        _ => tracing::debug!("{}", message),
    }
    log.write().push(level, message);
}

/// Bottom bar with the newest message; click to show the history.
#[component]
pub fn StatusBar() -> Element {
    let mut log = use_activity_log();
    let snapshot = log();
    let count = snapshot.entries.len();
    let latest = snapshot.latest().cloned();

    rsx! {
        document::Stylesheet { href: ACTIVITY_LOG_CSS }

        footer {
            class: "status-bar",
            if snapshot.expanded {
                div {
                    class: "status-history",
                    for (i, entry) in snapshot.entries.iter().enumerate().rev() {
                        div {
                            key: "{i}",
                            class: format!("status-entry {}", entry.level.css_class()),
                            span { class: "status-time", "{entry.timestamp}" }
                            span { " {entry.message}" }
                        }
                    }
                }
            }
            div {
                class: "status-line",
                if let Some(entry) = latest {
                    span {
                        class: format!("status-entry {}", entry.level.css_class()),
                        "{entry.message}"
                    }
                } else {
                    span { class: "status-entry idle", "Ready" }
                }
                div {
                    class: "status-actions",
                    button {
                        onclick: move |_| {
                            let expanded = log().expanded;
                            log.write().expanded = !expanded;
                        },
                        if snapshot.expanded { "Hide log" } else { "Log ({count})" }
                    }
                    button {
                        onclick: move |_| log.write().entries.clear(),
                        "Clear"
                    }
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn current_time() -> String {
    let date = js_sys::Date::new_0();
    let h = date.get_hours();
    let m = date.get_minutes();
    let s = date.get_seconds();
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(not(target_arch = "wasm32"))]
fn current_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_stamped_with_clock_time() {
        let mut log = ActivityLog::default();
        log.push(LogLevel::Success, "Classes saved successfully for project #1");

        let stamp = &log.entries[0].timestamp;
        assert!(chrono::NaiveTime::parse_from_str(stamp, "%H:%M:%S").is_ok(), "{stamp}");
    }

    #[test]
    fn test_push_keeps_latest_and_caps_history() {
        let mut log = ActivityLog::default();
        assert!(log.latest().is_none());

        for i in 0..(MAX_ENTRIES + 5) {
            log.push(LogLevel::Info, format!("entry {i}"));
        }
        assert_eq!(log.entries.len(), MAX_ENTRIES);
        assert_eq!(log.entries[0].message, "entry 5");
        assert_eq!(
            log.latest().map(|e| e.message.as_str()),
            Some(format!("entry {}", MAX_ENTRIES + 4).as_str())
        );
    }
}
