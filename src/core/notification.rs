//! Rendering and best-effort delivery of caretaker notifications.

use crate::core::assignment::{NotificationIntent, NotificationKind};
use crate::domain::ports::NotificationSink;
use std::borrow::Cow;
use std::time::Duration;

const GREETING: &str = "Prezado(a) {keeper},<br><br>";
const SIGN_OFF: &str = "<br><br>Atenciosamente,<br>Gerência do Zoológico";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub to: String,
    pub subject: String,
    /// HTML body.
    pub body: String,
}

fn templates(kind: NotificationKind) -> (&'static str, &'static str) {
    match kind {
        NotificationKind::NewAssignment => (
            "Novo Animal Atribuído: {animal}",
            "Um novo animal, <b>{animal}</b> (Espécie: {species}), foi atribuído a você.",
        ),
        NotificationKind::DetailsUpdated => (
            "Detalhes do Animal Atualizados: {animal}",
            "Os detalhes do animal <b>{animal}</b> (Espécie: {species}), atribuído a você, foram atualizados.",
        ),
        NotificationKind::Unassignment => (
            "Animal Desatribuído: {animal}",
            "O animal <b>{animal}</b> (Espécie: {species}) foi desatribuído de você.",
        ),
        NotificationKind::Deleted => (
            "Animal Removido: {animal}",
            "O animal <b>{animal}</b> (Espécie: {species}), que estava atribuído a você, foi removido do sistema.",
        ),
    }
}

fn html_escape(value: &str) -> Cow<'_, str> {
    if !value.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

fn plain(value: &str) -> Cow<'_, str> {
    Cow::Borrowed(value)
}

/// Single-pass placeholder substitution. Inserted values are never scanned
/// again, so free text containing `%`, `{animal}` or similar lands verbatim.
fn fill(
    template: &str,
    intent: &NotificationIntent,
    escape: for<'v> fn(&'v str) -> Cow<'v, str>,
) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let key = &after[..end];
        let value = match key {
            "keeper" => Some(intent.recipient.name.as_str()),
            "animal" => Some(intent.animal_name.as_str()),
            "species" => Some(intent.species.as_str()),
            _ => None,
        };
        match value {
            Some(v) => out.push_str(&escape(v)),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

pub fn render(intent: &NotificationIntent) -> RenderedEmail {
    let (subject, body) = templates(intent.kind);
    let html = format!("{}{}{}", GREETING, body, SIGN_OFF);
    RenderedEmail {
        to: intent.recipient.contact.clone(),
        subject: fill(subject, intent, plain),
        body: fill(&html, intent, html_escape),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Sends rendered intents through a sink. Never fails: delivery problems are
/// logged and counted, the triggering mutation has already committed.
pub struct NotificationDispatcher<N> {
    sink: N,
    timeout: Duration,
}

impl<N: NotificationSink> NotificationDispatcher<N> {
    pub fn new(sink: N, timeout: Duration) -> Self {
        Self { sink, timeout }
    }

    pub async fn dispatch(&self, intents: &[NotificationIntent]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for intent in intents {
            if intent.recipient.contact.trim().is_empty() {
                tracing::info!(
                    "Keeper {} has no contact address, skipping {:?} notification for {}",
                    intent.recipient.id,
                    intent.kind,
                    intent.animal_name
                );
                report.skipped += 1;
                continue;
            }

            let email = render(intent);
            tracing::debug!(
                "Sending {:?} notification for animal {} to {}",
                intent.kind,
                intent.animal_name,
                email.to
            );

            let attempt = tokio::time::timeout(
                self.timeout,
                self.sink.send(&email.to, &email.subject, &email.body),
            )
            .await;

            match attempt {
                Ok(Ok(())) => {
                    tracing::info!(
                        "Email notification sent for animal {} to keeper {}",
                        intent.animal_name,
                        intent.recipient.name
                    );
                    report.sent += 1;
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        "Failed to notify keeper {} about animal {}: {}",
                        intent.recipient.id,
                        intent.animal_name,
                        e
                    );
                    report.failed += 1;
                }
                Err(_) => {
                    tracing::warn!(
                        "Notification to keeper {} timed out after {:?}",
                        intent.recipient.id,
                        self.timeout
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }
}
