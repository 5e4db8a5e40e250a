// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed views of API resources.
//!
//! Only the fields the CLI renders or aggregates are modelled; everything
//! else is ignored on decode. Amounts are in cents, times in epoch ms.

use serde::{Deserialize, Serialize};

/// `{ "elements": [...] }` list envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub elements: Vec<T>,
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self { elements: Vec::new() }
    }
}

/// Reference to another resource by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct IdRef {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub timezone: Option<String>,
    pub default_currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub tip_amount: i64,
    #[serde(default)]
    pub tax_amount: i64,
    pub result: Option<String>,
    pub created_time: Option<i64>,
    pub order: Option<IdRef>,
    pub tender: Option<Tender>,
    pub employee: Option<IdRef>,
    pub card_transaction: Option<CardTransaction>,
}

impl Payment {
    /// Tender label, then card brand, then `Other`.
    pub fn method(&self) -> &str {
        self.tender
            .as_ref()
            .and_then(|t| t.label.as_deref())
            .or_else(|| self.card_transaction.as_ref().and_then(|c| c.card_type.as_deref()))
            .unwrap_or("Other")
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTransaction {
    pub card_type: Option<String>,
    pub last4: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    pub created_time: Option<i64>,
    pub payment: Option<IdRef>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub total: Option<i64>,
    pub state: Option<String>,
    pub note: Option<String>,
    pub created_time: Option<i64>,
    pub line_items: Option<ListResponse<LineItem>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<i64>,
    pub unit_qty: Option<i64>,
    pub item: Option<IdRef>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub price: Option<i64>,
    pub sku: Option<String>,
    pub available: Option<bool>,
    pub categories: Option<ListResponse<Category>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStock {
    pub item: Option<IdRef>,
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_addresses: Option<ListResponse<EmailAddress>>,
    pub phone_numbers: Option<ListResponse<PhoneNumber>>,
    pub customer_since: Option<i64>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn email(&self) -> Option<&str> {
        self.email_addresses.as_ref()?.elements.first()?.email_address.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone_numbers.as_ref()?.elements.first()?.phone_number.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Percentage discounts are stored scaled by 10000 (`25%` is `250000`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub percentage: Option<i64>,
    pub amount: Option<i64>,
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
