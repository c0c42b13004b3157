//! Output formatting for `ins-cli`

use crate::core::protocol::{CommandKind, Request};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for scripting
    Json,
}

/// Make CR/LF visible
pub fn escaped(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n")
}

/// Format the command table
pub fn format_command_list(format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = CommandKind::ALL
                .iter()
                .map(|kind| {
                    serde_json::json!({
                        "id": kind.id(),
                        "name": kind.name(),
                        "payload": kind.template(),
                        "reply": kind.expects_reply(),
                    })
                })
                .collect();
            serde_json::to_string_pretty(&rows).unwrap_or_default()
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for kind in CommandKind::ALL {
                let reply = if kind.expects_reply() { "  (reply)" } else { "" };
                out.push_str(&format!(
                    "{:>2}  {:<24} {}{}\n",
                    kind.id(),
                    kind.name(),
                    kind.template(),
                    reply
                ));
            }
            out
        }
    }
}

/// Format an encoded request
pub fn format_request(request: &Request, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::json!({
            "command": request.kind.name(),
            "id": request.kind.id(),
            "payload": request.payload,
            "checksum": request.checksum(),
            "message": request.message,
        })
        .to_string(),
        OutputFormat::Text => escaped(&request.message),
    }
}
