use crate::settings::Notifications;
use async_trait::async_trait;
use std::sync::Arc;

/// Outbound notification boundary. The portal treats delivery as
/// fire-and-forget: a failed send is logged and swallowed, never
/// surfaced to the caller of the operation that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String>;
}

/// Development notifier that writes the message to the log instead of
/// delivering it, mirroring what production does when no mail provider
/// is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String> {
        tracing::info!(to, subject, body_len = html_body.len(), "simulated email send");
        Ok(())
    }
}

/// Dispatch a notification after the surrounding transaction has
/// committed. Runs detached; failures are logged, not propagated.
pub fn dispatch(notifier: Arc<dyn Notifier>, to: String, subject: String, html_body: String) {
    tokio::spawn(async move {
        if let Err(e) = notifier.send(&to, &subject, &html_body).await {
            tracing::warn!(to, error = %e, "notification send failed");
        }
    });
}

/// Build the tenant invitation email sent when an owner adds a tenant
/// with a known email address.
pub fn invite_email(
    cfg: &Notifications,
    to_email: &str,
    tenant_name: &str,
    property_name: &str,
    unit_number: &str,
) -> (String, String) {
    let link = format!(
        "{}/register?mode=complete_profile&email={}",
        cfg.frontend_base_url.trim_end_matches('/'),
        to_email
    );
    let subject = "You're invited to join Quarters".to_string();
    let html = format!(
        "<h2>Welcome to Quarters!</h2>\
         <p>Hi {tenant_name},</p>\
         <p>You have been added as a tenant for <b>{unit_number} at {property_name}</b>.</p>\
         <p>Please follow the link below to complete your profile and access your \
         tenant dashboard:</p>\
         <p><a href=\"{link}\">Join Quarters</a></p>\
         <p>Or paste this link: {link}</p>"
    );
    (subject, html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_email_contains_registration_link() {
        let cfg = Notifications {
            frontend_base_url: "https://portal.example.com/".to_string(),
            from_address: "Quarters <noreply@example.com>".to_string(),
        };

        let (subject, html) = invite_email(&cfg, "jo@example.com", "Jo", "Hillview", "A-2");

        assert!(subject.contains("invited"));
        assert!(html.contains(
            "https://portal.example.com/register?mode=complete_profile&email=jo@example.com"
        ));
        assert!(html.contains("A-2 at Hillview"));
    }
}
