// src/utils/log.rs

//! Progress output for pipeline runs.
//!
//! Thin helpers over the `log` facade so headers, steps and summaries share
//! one layout while the binary's logger decides where they go.

/// Log an info message
pub fn info(message: &str) {
    ::log::info!("{}", message);
}

/// Log a warning message
pub fn warn(message: &str) {
    ::log::warn!("{}", message);
}

/// Log an error message
pub fn error(message: &str) {
    ::log::error!("{}", message);
}

/// Log a success message (shown as INFO)
pub fn success(message: &str) {
    ::log::info!("✓ {}", message);
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    ::log::info!("{}", format_step(step_num, total, message));
}

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    ::log::info!("{}", border);
    ::log::info!("  {}", title);
    ::log::info!("{}", border);
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    ::log::info!("    {}", message);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    ::log::info!("[SUMMARY] {}", title);
    for (key, value) in items {
        ::log::info!("    {}: {}", key, value);
    }
}

fn format_step(step_num: usize, total: usize, message: &str) -> String {
    format!("[{}/{}] {}", step_num, total, message)
}
