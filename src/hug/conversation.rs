//! Reply threads between staff and clients.
//!
//! Replies are append-only. An admin reply is stored before delivery is
//! attempted, so a mail failure never loses the message; `emailSent` only
//! flips once the provider accepts it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::db::DbHandle;
use super::lifecycle::status_after_reply;
use super::mail::{Mailer, ReplyTemplate};
use super::models::{Conversation, NewReply, Reply, SenderType};
use crate::errors::HugError;

/// Outcome of the mail leg of an admin reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    pub accepted: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyOutcome {
    pub reply: Reply,
    pub delivery: DeliveryReport,
}

fn non_empty_message(message: &str) -> Result<String, HugError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(HugError::invalid("message", "must not be empty"));
    }
    Ok(message.to_string())
}

pub async fn get_conversation(db: &DbHandle, order_id: &str) -> Result<Conversation, HugError> {
    let id = order_id.to_string();
    let found = db
        .call(move |db| {
            let Some(order) = db.get_order(&id)? else {
                return Ok(None);
            };
            let replies = db.list_replies(&id)?;
            Ok(Some(Conversation { order, replies }))
        })
        .await
        .map_err(HugError::Store)?;
    found.ok_or_else(|| HugError::OrderNotFound {
        id: order_id.to_string(),
    })
}

async fn append(
    db: &DbHandle,
    order_id: &str,
    reply: NewReply,
    now: DateTime<Utc>,
) -> Result<Reply, HugError> {
    let id = order_id.to_string();
    let status = status_after_reply(reply.sender_type);
    db.call(move |db| db.insert_reply(&id, &reply, now, status))
        .await
        .map_err(HugError::Store)?
        .ok_or_else(|| HugError::OrderNotFound {
            id: order_id.to_string(),
        })
}

/// Append a staff reply and email it to the order's address.
pub async fn append_admin_reply(
    db: &DbHandle,
    mailer: &dyn Mailer,
    template: &ReplyTemplate,
    order_id: &str,
    sender_name: &str,
    message: &str,
    now: DateTime<Utc>,
) -> Result<ReplyOutcome, HugError> {
    let message = non_empty_message(message)?;
    let conversation = get_conversation(db, order_id).await?;

    let reply = append(
        db,
        order_id,
        NewReply {
            sender_type: SenderType::Admin,
            sender_name: sender_name.to_string(),
            message: message.clone(),
        },
        now,
    )
    .await?;

    let mail = template.render(&conversation.order, sender_name, &message);
    let (reply, delivery) = match mailer.send(&mail).await {
        Ok(receipt) if receipt.accepted => {
            let reply_id = reply.id.clone();
            let message_id = receipt.message_id.clone();
            match db
                .call(move |db| db.mark_email_sent(&reply_id, message_id.as_deref()))
                .await
            {
                Ok(updated) => (
                    updated,
                    DeliveryReport {
                        accepted: true,
                        message_id: receipt.message_id,
                        error: None,
                    },
                ),
                Err(e) => {
                    tracing::warn!(reply_id = %reply.id, error = %e, "email accepted but flag not saved");
                    (
                        reply,
                        DeliveryReport {
                            accepted: true,
                            message_id: receipt.message_id,
                            error: Some(HugError::Store(e).to_string()),
                        },
                    )
                }
            }
        }
        Ok(_) => {
            tracing::warn!(reply_id = %reply.id, "mail provider did not accept reply");
            (
                reply,
                DeliveryReport {
                    error: Some("Mail provider did not accept the message".to_string()),
                    ..Default::default()
                },
            )
        }
        Err(e) => {
            let err = HugError::Mail(format!("{:#}", e));
            tracing::warn!(reply_id = %reply.id, error = %err, "reply stored but not emailed");
            (
                reply,
                DeliveryReport {
                    error: Some(err.to_string()),
                    ..Default::default()
                },
            )
        }
    };

    tracing::info!(order_id, reply_id = %reply.id, email_sent = reply.email_sent, "admin reply appended");
    Ok(ReplyOutcome { reply, delivery })
}

/// Append a reply arriving from the client. `email` must match the order.
pub async fn append_client_reply(
    db: &DbHandle,
    order_id: &str,
    email: &str,
    message: &str,
    now: DateTime<Utc>,
) -> Result<Reply, HugError> {
    let message = non_empty_message(message)?;
    let conversation = get_conversation(db, order_id).await?;
    if !conversation.order.email.eq_ignore_ascii_case(email.trim()) {
        return Err(HugError::Unauthorized(
            "email does not match this order".to_string(),
        ));
    }

    let reply = append(
        db,
        order_id,
        NewReply {
            sender_type: SenderType::Client,
            sender_name: conversation.order.name.clone(),
            message,
        },
        now,
    )
    .await?;
    tracing::info!(order_id, reply_id = %reply.id, "client reply appended");
    Ok(reply)
}

/// Mark a client reply as read. Marking it again is a no-op.
pub async fn mark_read(db: &DbHandle, reply_id: &str) -> Result<Reply, HugError> {
    let id = reply_id.to_string();
    let existing = db
        .call(move |db| db.get_reply(&id))
        .await
        .map_err(HugError::Store)?
        .ok_or_else(|| HugError::ReplyNotFound {
            id: reply_id.to_string(),
        })?;

    if existing.sender_type != SenderType::Client {
        return Err(HugError::invalid(
            "replyId",
            "only client replies have a read state",
        ));
    }
    if existing.is_read {
        return Ok(existing);
    }

    let id = reply_id.to_string();
    db.call(move |db| db.mark_reply_read(&id))
        .await
        .map_err(HugError::Store)?
        .ok_or_else(|| HugError::ReplyNotFound {
            id: reply_id.to_string(),
        })
}

pub async fn unread_count(db: &DbHandle) -> Result<i64, HugError> {
    db.call(|db| db.count_unread_client_replies())
        .await
        .map_err(HugError::Store)
}
