//! Reminder email rendering and SMTP delivery.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Askama
//! autoescapes the HTML body, so customer and product names are safe to
//! interpolate as-is.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use replenish_core::Email;

use crate::config::EmailConfig;

/// HTML template for the repurchase reminder email.
#[derive(Template)]
#[template(path = "email/repurchase_reminder.html")]
struct ReminderEmailHtml<'a> {
    customer_name: &'a str,
    product_name: &'a str,
    product_price: &'a str,
    product_url: &'a str,
    product_image: Option<&'a str>,
}

/// Plain text template for the repurchase reminder email.
#[derive(Template)]
#[template(path = "email/repurchase_reminder.txt")]
struct ReminderEmailText<'a> {
    customer_name: &'a str,
    product_name: &'a str,
    product_price: &'a str,
    product_url: &'a str,
}

/// Errors that can occur when rendering or sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Non-SMTP transport failure (used by alternative transports and
    /// test doubles).
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Variables interpolated into the reminder templates.
#[derive(Debug, Clone, Copy)]
pub struct ReminderVars<'a> {
    pub customer_name: &'a str,
    pub product_name: &'a str,
    /// Price already formatted to two decimal places.
    pub product_price: &'a str,
    pub product_url: &'a str,
    pub product_image: Option<&'a str>,
}

/// Render the reminder body pair (text, html).
///
/// # Errors
///
/// Returns an error if either template fails to render.
pub fn render_reminder_body(vars: &ReminderVars<'_>) -> Result<(String, String), EmailError> {
    let html = ReminderEmailHtml {
        customer_name: vars.customer_name,
        product_name: vars.product_name,
        product_price: vars.product_price,
        product_url: vars.product_url,
        product_image: vars.product_image,
    }
    .render()?;

    let text = ReminderEmailText {
        customer_name: vars.customer_name,
        product_name: vars.product_name,
        product_price: vars.product_price,
        product_url: vars.product_url,
    }
    .render()?;

    Ok((text, html))
}

/// A fully rendered reminder, ready for a transport.
#[derive(Debug, Clone)]
pub struct ReminderEmail {
    pub to_address: Email,
    pub to_name: String,
    pub from_address: String,
    pub from_name: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Delivery channel for rendered reminders.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Hand one message to the transport.
    async fn send(&self, email: &ReminderEmail) -> Result<(), EmailError>;
}

/// SMTP transport for reminder emails.
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self { mailer })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &ReminderEmail) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(mailbox(&email.from_name, &email.from_address)?)
            .to(mailbox(&email.to_name, email.to_address.as_str())?)
            .subject(email.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )?;

        self.mailer.send(message).await?;

        tracing::info!(to = %email.to_address, subject = %email.subject, "Email sent");
        Ok(())
    }
}

fn mailbox(name: &str, address: &str) -> Result<Mailbox, EmailError> {
    let address = address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_string()))?;

    let name = if name.trim().is_empty() {
        None
    } else {
        Some(name.to_string())
    };

    Ok(Mailbox::new(name, address))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn vars<'a>(image: Option<&'a str>) -> ReminderVars<'a> {
        ReminderVars {
            customer_name: "Ada & Co",
            product_name: "Green <Tea>",
            product_price: "12.50",
            product_url: "https://shop.example.com/green-tea",
            product_image: image,
        }
    }

    #[test]
    fn test_html_body_escapes_names() {
        let (_, html) = render_reminder_body(&vars(None)).unwrap();
        assert!(html.contains("Ada &amp; Co"));
        assert!(html.contains("Green &lt;Tea&gt;"));
        assert!(!html.contains("Green <Tea>"));
    }

    #[test]
    fn test_html_body_includes_image_when_present() {
        let image = "https://cdn.example.com/media/catalog/product/t/e/tea.jpg";
        let (_, html) = render_reminder_body(&vars(Some(image))).unwrap();
        assert!(html.contains(image));
    }

    #[test]
    fn test_text_body_carries_price_and_url() {
        let (text, _) = render_reminder_body(&vars(None)).unwrap();
        assert!(text.contains("12.50"));
        assert!(text.contains("https://shop.example.com/green-tea"));
    }

    #[test]
    fn test_mailbox_with_empty_name() {
        let mailbox = mailbox("  ", "a@x.com").unwrap();
        assert!(mailbox.name.is_none());
    }

    #[test]
    fn test_mailbox_rejects_bad_address() {
        assert!(matches!(
            mailbox("Ada", "not-an-address"),
            Err(EmailError::InvalidAddress(_))
        ));
    }
}
