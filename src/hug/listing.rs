//! Dashboard listing: search, filter, sort and summary statistics over a
//! snapshot of every order. Pure functions of (orders, query, now).

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::models::{Order, OrderStatus, ServiceType};
use crate::errors::HugError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(format!(
                "Invalid time window '{}'. Valid values: all, today, week, month",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Newest first.
    #[default]
    Date,
    Name,
    Status,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "name" => Ok(Self::Name),
            "status" => Ok(Self::Status),
            _ => Err(format!(
                "Invalid sort '{}'. Valid values: date, name, status",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub service_type: Option<ServiceType>,
    pub time: TimeWindow,
    pub sort: SortKey,
}

/// Query-string form of `OrderQuery`. `"all"` and empty values mean no filter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub service_type: Option<String>,
    pub time: Option<String>,
    pub sort: Option<String>,
}

fn selected(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl ListingParams {
    pub fn into_query(self) -> Result<OrderQuery, HugError> {
        let status = selected(&self.status)
            .map(OrderStatus::from_str)
            .transpose()
            .map_err(|e| HugError::invalid("status", e))?;
        let service_type = selected(&self.service_type)
            .map(ServiceType::from_str)
            .transpose()
            .map_err(|e| HugError::invalid("serviceType", e))?;
        let time = selected(&self.time)
            .map(TimeWindow::from_str)
            .transpose()
            .map_err(|e| HugError::invalid("time", e))?
            .unwrap_or_default();
        let sort = self
            .sort
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(SortKey::from_str)
            .transpose()
            .map_err(|e| HugError::invalid("sort", e))?
            .unwrap_or_default();
        let search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Ok(OrderQuery {
            search,
            status,
            service_type,
            time,
            sort,
        })
    }
}

fn matches_search(order: &Order, needle: &str) -> bool {
    [
        order.name.as_str(),
        order.email.as_str(),
        order.service_type.as_str(),
        order.recipient_name.as_str(),
    ]
    .iter()
    .any(|haystack| haystack.to_lowercase().contains(needle))
}

fn in_window<Tz: TimeZone>(created_at: &DateTime<Utc>, window: TimeWindow, now: &DateTime<Tz>) -> bool {
    let now_utc = now.with_timezone(&Utc);
    match window {
        TimeWindow::All => true,
        TimeWindow::Today => {
            created_at.with_timezone(&now.timezone()).date_naive() == now.date_naive()
        }
        TimeWindow::Week => *created_at >= now_utc - Duration::days(7),
        TimeWindow::Month => *created_at >= now_utc - Duration::days(30),
    }
}

/// Apply search, status, service type and time filters in that order, then
/// sort. "Today" is the calendar day of `now` in `now`'s own time zone.
/// Ties keep their snapshot order.
pub fn filter_orders<Tz: TimeZone>(
    orders: &[Order],
    query: &OrderQuery,
    now: &DateTime<Tz>,
) -> Vec<Order> {
    let needle = query.search.as_deref().map(str::to_lowercase);
    let mut result: Vec<Order> = orders
        .iter()
        .filter(|o| needle.as_deref().is_none_or(|n| matches_search(o, n)))
        .filter(|o| query.status.is_none_or(|s| o.status == s))
        .filter(|o| query.service_type.is_none_or(|t| o.service_type == t))
        .filter(|o| in_window(&o.created_at, query.time, now))
        .cloned()
        .collect();

    match query.sort {
        SortKey::Date => result.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Name => result.sort_by_key(|o| o.name.to_lowercase()),
        SortKey::Status => result.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str())),
    }
    result
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub new: usize,
    pub in_progress: usize,
    pub replied: usize,
    pub client_replied: usize,
    pub completed: usize,
    pub today: usize,
    pub this_week: usize,
    /// Percentage of orders that are Replied or Completed.
    pub response_rate: u32,
    pub unread_replies: i64,
    pub by_service_type: BTreeMap<String, usize>,
}

impl DashboardStats {
    pub fn compute<Tz: TimeZone>(orders: &[Order], unread_replies: i64, now: &DateTime<Tz>) -> Self {
        let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();
        let total = orders.len();
        let replied = count(OrderStatus::Replied);
        let completed = count(OrderStatus::Completed);
        let response_rate = if total == 0 {
            0
        } else {
            (((replied + completed) as f64 / total as f64) * 100.0).round() as u32
        };

        let mut by_service_type = BTreeMap::new();
        for order in orders {
            *by_service_type
                .entry(order.service_type.as_str().to_string())
                .or_insert(0) += 1;
        }

        Self {
            total,
            new: count(OrderStatus::New),
            in_progress: count(OrderStatus::InProgress),
            replied,
            client_replied: count(OrderStatus::ClientReplied),
            completed,
            today: orders
                .iter()
                .filter(|o| in_window(&o.created_at, TimeWindow::Today, now))
                .count(),
            this_week: orders
                .iter()
                .filter(|o| in_window(&o.created_at, TimeWindow::Week, now))
                .count(),
            response_rate,
            unread_replies,
            by_service_type,
        }
    }
}
