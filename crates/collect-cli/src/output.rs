//! Terminal output for `auditlog`
//!
//! Human mode prints a heading plus indented lines on stdout. JSON mode
//! prints only structured payloads on stdout; warnings and errors go to
//! stderr as one-line JSON objects.

/// Output format selected by the global `--json` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }

    pub fn is_json(self) -> bool {
        self == OutputFormat::Json
    }
}

/// Sink for command output
pub trait OutputFormatter {
    /// First line of a human report
    fn heading(&self, message: &str);
    /// Body line of a human report
    fn line(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    /// Structured payload; ignored in human mode
    fn json(&self, value: &serde_json::Value);
}

struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn heading(&self, message: &str) {
        println!("\u{2713} {message}");
    }

    fn line(&self, message: &str) {
        println!("  {message}");
    }

    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("\u{2717} {message}");
    }

    fn json(&self, _value: &serde_json::Value) {}
}

struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn heading(&self, _message: &str) {}

    fn line(&self, _message: &str) {}

    fn warn(&self, message: &str) {
        eprintln!("{}", serde_json::json!({ "warning": message }));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", serde_json::json!({ "error": message }));
    }

    fn json(&self, value: &serde_json::Value) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{text}"),
            Err(e) => tracing::warn!(error = %e, "Failed to render JSON output"),
        }
    }
}

/// Returns the formatter for `format`
pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Human => Box::new(HumanFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
