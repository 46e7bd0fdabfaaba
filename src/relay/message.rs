use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::WebhookConfig;
use crate::session::SessionUser;

pub const EMBED_COLOR: u32 = 0xf97316;

/// Webhook payload. `allowed_mentions.parse` is always empty so rendered
/// member mentions stay inert text and never ping on the destination side.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookMessage {
    pub username: String,
    pub allowed_mentions: AllowedMentions,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AllowedMentions {
    pub parse: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub footer: EmbedFooter,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Assemble the embed for one submission from already-formatted fields.
pub fn render_message(
    form_name: &str,
    fields: &[(String, String)],
    submitter: &SessionUser,
    config: &WebhookConfig,
) -> WebhookMessage {
    let mut parts: Vec<String> = Vec::new();
    if let Some(line) = &config.header_line {
        parts.push(line.clone());
        parts.push(String::new());
    }
    for (label, value) in fields {
        let shown = if value.trim().is_empty() { "*n/a*" } else { value };
        parts.push(format!("**{}:**\n{}", label, shown));
    }

    let title = if form_name.trim().is_empty() {
        "Portal Submission".to_string()
    } else {
        form_name.to_string()
    };

    WebhookMessage {
        username: config.username.clone(),
        allowed_mentions: AllowedMentions::default(),
        embeds: vec![Embed {
            title,
            description: parts.join("\n\n"),
            color: EMBED_COLOR,
            footer: EmbedFooter {
                text: footer_text(submitter),
            },
            timestamp: Utc::now(),
        }],
    }
}

/// `Submitted by <name> [<display>] | ID: <id>`; the bracketed display name
/// appears only when it differs from the account name.
fn footer_text(submitter: &SessionUser) -> String {
    let display = submitter.display_name.trim();
    let suffix = if !display.is_empty() && display != submitter.username {
        if display.starts_with('[') {
            format!(" {}", display)
        } else {
            format!(" [{}]", display)
        }
    } else {
        String::new()
    };

    format!(
        "Submitted by {}{} | ID: {}",
        submitter.username, suffix, submitter.id
    )
}
