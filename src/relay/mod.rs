pub mod format;
pub mod message;
pub mod sink;

pub use message::WebhookMessage;
pub use sink::{DeliveryError, Sink, WebhookSink};

use std::collections::HashMap;

use thiserror::Error;

use crate::config::WebhookConfig;
use crate::discord::MemberDirectory;
use crate::logs::{LogStore, NewLogRecord};
use crate::session::SessionUser;

use format::{
    collapse_fields, extract_snowflakes, is_discord_id_label, replace_id, wrap_display_name,
};
use message::render_message;

/// One submission to format, deliver, and archive.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub form_name: String,
    pub fields: Vec<(String, String)>,
    pub destination: String,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Format a submission, deliver it to the destination, and store the
/// original field pairs. The record is stored only after confirmed
/// delivery; a storage failure after delivery is logged, not surfaced.
pub async fn relay_submission(
    directory: &dyn MemberDirectory,
    sink: &dyn Sink,
    store: &dyn LogStore,
    submitter: &SessionUser,
    webhook: &WebhookConfig,
    request: RelayRequest,
) -> Result<(), RelayError> {
    let collapsed = collapse_fields(&request.fields);

    // Display-name memo scoped to this one invocation, never shared.
    let mut memo: HashMap<String, String> = HashMap::new();
    let mut formatted: Vec<(String, String)> = Vec::with_capacity(collapsed.len());
    for (label, value) in &collapsed {
        let rendered = format_identifier_mentions(directory, &mut memo, label, value).await;
        formatted.push((label.clone(), rendered));
    }

    let payload = render_message(&request.form_name, &formatted, submitter, webhook);
    sink.deliver(&request.destination, &payload).await?;

    let record = NewLogRecord {
        user_id: submitter.id.clone(),
        username: submitter.username.clone(),
        display_name: submitter.display_name.clone(),
        form_type: request.form_name.clone(),
        fields: collapsed,
    };
    if let Err(e) = store.append(&record).await {
        tracing::warn!("failed to store relayed submission: {}", e);
    }

    Ok(())
}

/// Rewrite member ids in an identifier-bearing field to
/// `[DisplayName] - (id) <@id>`; unresolvable ids render as
/// `(Unknown User)`. Other fields pass through untouched.
async fn format_identifier_mentions(
    directory: &dyn MemberDirectory,
    memo: &mut HashMap<String, String>,
    label: &str,
    value: &str,
) -> String {
    if value.is_empty() || !is_discord_id_label(label) {
        return value.to_string();
    }

    let ids = extract_snowflakes(value);
    if ids.is_empty() {
        return value.to_string();
    }

    let mut out = value.to_string();
    for id in ids {
        let name = match memo.get(&id) {
            Some(cached) => cached.clone(),
            None => {
                let resolved = directory.display_name(&id).await;
                memo.insert(id.clone(), resolved.clone());
                resolved
            }
        };

        let wrapped = wrap_display_name(&name);
        let shown = if wrapped.is_empty() {
            "(Unknown User)".to_string()
        } else {
            wrapped
        };
        let replacement = format!("{} - ({}) <@{}>", shown, id, id);
        out = replace_id(&out, &id, &replacement);
    }

    out
}
