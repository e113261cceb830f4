use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::models::Order;

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// What the mail provider said about one message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryReceipt {
    pub accepted: bool,
    pub message_id: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutboundMail) -> Result<DeliveryReceipt>;
}

/// Used when no mail provider is configured; nothing is ever accepted.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, mail: &OutboundMail) -> Result<DeliveryReceipt> {
        tracing::debug!(to = %mail.to, "mail disabled; reply not delivered");
        Ok(DeliveryReceipt::default())
    }
}

/// Transactional-mail HTTP API client (`POST {from, to, subject, text}`
/// with a bearer key, response `{"id": ...}`).
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    id: Option<String>,
}

impl HttpMailer {
    pub fn new(endpoint: &str, api_key: &str, from: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build mail HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: &OutboundMail) -> Result<DeliveryReceipt> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SendRequest {
                from: &self.from,
                to: [&mail.to],
                subject: &mail.subject,
                text: &mail.body,
            })
            .send()
            .await
            .context("Failed to reach mail provider")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Mail provider returned {}: {}", status, text.trim());
        }

        let body: SendResponse = resp
            .json()
            .await
            .context("Failed to parse mail provider response")?;
        Ok(DeliveryReceipt {
            accepted: true,
            message_id: body.id,
        })
    }
}

/// Subject and sign-off for admin replies. `{service_type}` and
/// `{recipient_name}` in the subject are replaced per order.
#[derive(Debug, Clone)]
pub struct ReplyTemplate {
    pub subject: String,
}

impl ReplyTemplate {
    pub fn render(&self, order: &Order, sender_name: &str, message: &str) -> OutboundMail {
        let subject = self
            .subject
            .replace("{service_type}", order.service_type.as_str())
            .replace("{recipient_name}", &order.recipient_name);
        let body = format!(
            "Dear {},\n\n{}\n\nWith warmth,\n{}",
            order.name,
            message.trim(),
            sender_name
        );
        OutboundMail {
            to: order.email.clone(),
            subject,
            body,
        }
    }
}

impl Default for ReplyTemplate {
    fn default() -> Self {
        Self {
            subject: "Re: your {service_type} for {recipient_name} - The Written Hug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hug::models::*;
    use chrono::Utc;

    fn order() -> Order {
        Order {
            id: "o-1".into(),
            name: "Ravi".into(),
            email: "ravi@example.com".into(),
            phone: "123".into(),
            recipient_name: "Asha".into(),
            recipient_address: "Pune".into(),
            service_type: ServiceType::BirthdayMessage,
            delivery_type: DeliveryType::Express,
            feelings: "joy".into(),
            story: "story".into(),
            specific_details: None,
            status: OrderStatus::New,
            created_at: Utc::now(),
            location: None,
            device: None,
        }
    }

    #[test]
    fn test_template_renders_subject_and_body() {
        let mail = ReplyTemplate::default().render(&order(), "CEO", "  Thank you for your story  ");
        assert_eq!(mail.to, "ravi@example.com");
        assert_eq!(
            mail.subject,
            "Re: your Birthday Message for Asha - The Written Hug"
        );
        assert!(mail.body.starts_with("Dear Ravi,"));
        assert!(mail.body.contains("\nThank you for your story\n"));
        assert!(mail.body.ends_with("CEO"));
    }

    #[tokio::test]
    async fn test_disabled_mailer_never_accepts() {
        let mail = ReplyTemplate::default().render(&order(), "CEO", "hi");
        let receipt = DisabledMailer.send(&mail).await.unwrap();
        assert!(!receipt.accepted);
        assert!(receipt.message_id.is_none());
    }

    #[test]
    fn test_send_request_shape() {
        let json = serde_json::to_value(SendRequest {
            from: "hello@writtenhug.in",
            to: ["ravi@example.com"],
            subject: "s",
            text: "t",
        })
        .unwrap();
        assert_eq!(json["to"][0], "ravi@example.com");
        assert_eq!(json["text"], "t");
    }
}
