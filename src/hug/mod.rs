//! The Written Hug order service.
//!
//! ## Overview
//!
//! Clients submit letter orders through a public form. The studio works
//! them from an admin dashboard: filtering the listing, replying in a
//! per-order conversation thread that is also emailed to the client, and
//! moving orders through their status lifecycle.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, ServerConfig)          │
//! │  / Admin │ <─────── │    └─ api.rs  (route handlers, AppState)         │
//! └──────────┘          │         │    └─ auth.rs (require_admin guard)    │
//!                       │         v                                        │
//!                       │  intake.rs · listing.rs · conversation.rs        │
//!                       │  lifecycle.rs                                    │
//!                       │         │                  │                     │
//!                       │         v                  v                     │
//!                       │  db.rs (SQLite)     mail.rs · geo.rs (HTTP)      │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module    | Responsibility                                              |
//! |-----------|-------------------------------------------------------------|
//! | `models`  | `Order`, `Reply`, `OrderStatus`, `ServiceType`, `AdminLogin`|
//! | `db`      | SQLite access via `DbHandle` (thin `Arc<Mutex<_>>`)         |
//! | `mail`    | `Mailer` trait, HTTP mail client, reply template            |
//! | `geo`     | `ReverseGeocoder` trait, BigDataCloud client                |
//! | `device`  | User-agent → `"Platform | Browser"`                         |
//!
//! ## Typical Request Flow (admin reply)
//!
//! 1. `POST /api/admin/orders/{id}/replies` passes `auth::require_admin`.
//! 2. `conversation::append_admin_reply()` validates the message, then stores
//!    the reply and moves the order to `Replied` in one transaction.
//! 3. The reply is rendered through `ReplyTemplate` and handed to the
//!    `Mailer`. Only an accepted send flips `emailSent`; a failed send is
//!    reported in the response and the stored reply stays.

pub mod api;
pub mod auth;
pub mod conversation;
pub mod db;
pub mod device;
pub mod geo;
pub mod intake;
pub mod lifecycle;
pub mod listing;
pub mod mail;
pub mod models;
pub mod server;
