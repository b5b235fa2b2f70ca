//! Notification delivery channels
//!
//! Reminders are delivered over one of two channels: a chat webhook (a Google Chat incoming
//! webhook, or anything accepting the same `{"text": ...}` payload), or a plain SMTP e-mail to
//! the task owner. The [`ChannelNotifier`] carries both and lets the dispatcher pick.

use std::error::Error;

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use url::Url;

use crate::config;
use crate::traits::Notifier;

/// SMTP connection settings for the e-mail fallback channel
#[derive(Clone, Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// The address reminder e-mails are sent from
    pub from_address: String,
}

struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

/// The production [`Notifier`]: a chat webhook when one is configured, SMTP otherwise.
///
/// Either channel (or both) may be absent; sending over an absent channel is an error the
/// dispatcher logs and retries on a later tick
pub struct ChannelNotifier {
    webhook_url: Option<Url>,
    http_client: reqwest::Client,
    mailer: Option<Mailer>,
}

impl ChannelNotifier {
    pub fn new(webhook_url: Option<Url>, smtp: Option<SmtpSettings>) -> Result<Self, Box<dyn Error>> {
        let mailer = match smtp {
            None => None,
            Some(settings) => Some(build_mailer(settings)?),
        };

        Ok(Self {
            webhook_url,
            http_client: reqwest::Client::new(),
            mailer,
        })
    }

    /// Build a notifier from the environment the application server is usually deployed with:
    /// `GOOGLE_CHAT_WEBHOOK_URL` for the chat channel, and `EMAIL_HOST`, `EMAIL_PORT`
    /// (defaults to 587), `EMAIL_USER` and `EMAIL_PASSWORD` for the SMTP fallback
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        let webhook_url = match std::env::var("GOOGLE_CHAT_WEBHOOK_URL") {
            Ok(raw) => Some(raw.parse()?),
            Err(_) => None,
        };

        let smtp = match std::env::var("EMAIL_HOST") {
            Err(_) => None,
            Ok(host) => {
                let port = match std::env::var("EMAIL_PORT") {
                    Ok(raw) => raw.parse()?,
                    Err(_) => 587,
                };
                let username = std::env::var("EMAIL_USER").ok();
                let password = std::env::var("EMAIL_PASSWORD").ok();
                let from_address = match &username {
                    Some(user) => user.clone(),
                    None => return Err("EMAIL_HOST is set but EMAIL_USER is not, no sender address available".into()),
                };
                Some(SmtpSettings { host, port, username, password, from_address })
            },
        };

        Self::new(webhook_url, smtp)
    }
}

fn build_mailer(settings: SmtpSettings) -> Result<Mailer, Box<dyn Error>> {
    let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
        .port(settings.port);

    if let (Some(username), Some(password)) = (settings.username, settings.password) {
        builder = builder.credentials(Credentials::new(username, password));
    }

    let app_name = config::APP_NAME.lock().unwrap().clone();
    let from = Mailbox::new(Some(app_name), settings.from_address.parse::<Address>()?);

    Ok(Mailer {
        transport: builder.build(),
        from,
    })
}

#[async_trait]
impl Notifier for ChannelNotifier {
    fn chat_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    async fn send_chat(&self, text: &str) -> Result<(), Box<dyn Error>> {
        let url = match &self.webhook_url {
            Some(url) => url.clone(),
            None => return Err("No chat webhook configured".into()),
        };

        self.http_client
            .post(url)
            .json(&serde_json::json!({ "text": text }))
            .send().await?
            .error_for_status()?;

        log::debug!("Chat message sent");
        Ok(())
    }

    async fn send_email(&self, to: &str, subject: &str, text: &str, html: Option<&str>) -> Result<(), Box<dyn Error>> {
        let mailer = match &self.mailer {
            Some(mailer) => mailer,
            None => return Err("No SMTP settings configured".into()),
        };

        let builder = Message::builder()
            .from(mailer.from.clone())
            .to(to.parse()?)
            .subject(subject);

        let message = match html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(text.to_string(), html.to_string()))?,
            None => builder.body(text.to_string())?,
        };

        mailer.transport.send(message).await?;

        log::debug!("E-mail sent to {}", to);
        Ok(())
    }
}
