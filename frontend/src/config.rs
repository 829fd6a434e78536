/// Prefix for every key this app writes to local storage.
pub const STORAGE_NAMESPACE: &str = "analysis-wizard";

pub const AUTOSAVE_DELAY_MS: u32 = 900;

#[cfg(debug_assertions)]
pub fn get_mail_function_url() -> &'static str {
    match option_env!("MAIL_FUNCTION_URL") {
        Some(url) => url,
        None => "http://localhost:54321/functions/v1/send-report-email", // Local functions runtime
    }
}

#[cfg(not(debug_assertions))]
pub fn get_mail_function_url() -> &'static str {
    match option_env!("MAIL_FUNCTION_URL") {
        Some(url) => url,
        None => "/functions/v1/send-report-email",
    }
}

/// Bearer credential for the mail function, baked in at build time.
pub fn get_mail_function_key() -> &'static str {
    option_env!("MAIL_FUNCTION_KEY").unwrap_or("")
}
