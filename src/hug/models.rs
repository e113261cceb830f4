use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse lifecycle label on an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    Replied,
    #[serde(rename = "Client Replied")]
    ClientReplied,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::New,
        Self::InProgress,
        Self::Replied,
        Self::ClientReplied,
        Self::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "In Progress",
            Self::Replied => "Replied",
            Self::ClientReplied => "Client Replied",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ServiceType {
    #[serde(rename = "Love Letter")]
    LoveLetter,
    #[serde(rename = "Gratitude Message")]
    GratitudeMessage,
    #[serde(rename = "Apology Letter")]
    ApologyLetter,
    #[serde(rename = "Birthday Message")]
    BirthdayMessage,
    #[serde(rename = "Anniversary Letter")]
    AnniversaryLetter,
    #[serde(rename = "Thank You Note")]
    ThankYouNote,
    #[serde(rename = "Friendship Letter")]
    FriendshipLetter,
    #[serde(rename = "Family Message")]
    FamilyMessage,
    #[serde(rename = "Custom Request")]
    CustomRequest,
}

impl ServiceType {
    pub const ALL: [ServiceType; 9] = [
        Self::LoveLetter,
        Self::GratitudeMessage,
        Self::ApologyLetter,
        Self::BirthdayMessage,
        Self::AnniversaryLetter,
        Self::ThankYouNote,
        Self::FriendshipLetter,
        Self::FamilyMessage,
        Self::CustomRequest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoveLetter => "Love Letter",
            Self::GratitudeMessage => "Gratitude Message",
            Self::ApologyLetter => "Apology Letter",
            Self::BirthdayMessage => "Birthday Message",
            Self::AnniversaryLetter => "Anniversary Letter",
            Self::ThankYouNote => "Thank You Note",
            Self::FriendshipLetter => "Friendship Letter",
            Self::FamilyMessage => "Family Message",
            Self::CustomRequest => "Custom Request",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| format!("Invalid service type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryType {
    #[serde(rename = "Standard Delivery")]
    Standard,
    #[serde(rename = "Express Delivery")]
    Express,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "Standard Delivery",
            Self::Express => "Express Delivery",
        }
    }
}

impl FromStr for DeliveryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard Delivery" => Ok(Self::Standard),
            "Express Delivery" => Ok(Self::Express),
            _ => Err(format!("Invalid delivery type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    Admin,
    Client,
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
        }
    }
}

impl FromStr for SenderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "client" => Ok(Self::Client),
            _ => Err(format!("Invalid sender type: {}", s)),
        }
    }
}

/// Best-effort place captured at submission time. City and country stay
/// `None` when they could not be resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub recipient_name: String,
    pub recipient_address: String,
    pub service_type: ServiceType,
    pub delivery_type: DeliveryType,
    pub feelings: String,
    pub story: String,
    pub specific_details: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub location: Option<Location>,
    pub device: Option<String>,
}

/// A validated order ready to be inserted. Id, status and timestamp are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub recipient_name: String,
    pub recipient_address: String,
    pub service_type: ServiceType,
    pub delivery_type: DeliveryType,
    pub feelings: String,
    pub story: String,
    pub specific_details: Option<String>,
    pub location: Option<Location>,
    pub device: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    pub sender_type: SenderType,
    pub sender_name: String,
    pub message: String,
    pub email_sent: bool,
    pub email_message_id: Option<String>,
    pub is_read: bool,
}

#[derive(Debug, Clone)]
pub struct NewReply {
    pub sender_type: SenderType,
    pub sender_name: String,
    pub message: String,
}

/// Audit entry written on every successful admin login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLogin {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub location: Option<String>,
    pub ip_address: String,
    pub user_agent: String,
}

// API view types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub order: Order,
    pub replies: Vec<Reply>,
}
