//! Database model for accounts.

use std::str::FromStr;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kakebo_core::accounts::{Account, AccountKind, NewAccount};
use kakebo_core::errors::{Error, Result};

use crate::utils::{format_datetime, parse_datetime, parse_decimal, parse_optional_decimal};

/// Database model for accounts.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: String,
    pub balance: String,
    pub credit_limit: Option<String>,
    pub billing_day: Option<i32>,
    pub due_day: Option<i32>,
    pub shares: Option<String>,
    pub cost_price: Option<String>,
    pub current_net_value: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<AccountDB> for Account {
    type Error = Error;

    fn try_from(db: AccountDB) -> Result<Account> {
        Ok(Account {
            kind: AccountKind::from_str(&db.kind)?,
            balance: parse_decimal(&db.balance, "account.balance"),
            credit_limit: parse_optional_decimal(db.credit_limit.as_deref(), "account.creditLimit"),
            billing_day: db.billing_day.map(|d| d as u32),
            due_day: db.due_day.map(|d| d as u32),
            shares: parse_optional_decimal(db.shares.as_deref(), "account.shares"),
            cost_price: parse_optional_decimal(db.cost_price.as_deref(), "account.costPrice"),
            current_net_value: parse_optional_decimal(
                db.current_net_value.as_deref(),
                "account.currentNetValue",
            ),
            created_at: parse_datetime(&db.created_at, "account.createdAt"),
            updated_at: parse_datetime(&db.updated_at, "account.updatedAt"),
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            is_active: db.is_active,
        })
    }
}

impl From<NewAccount> for AccountDB {
    fn from(domain: NewAccount) -> Self {
        let now = format_datetime(chrono::Utc::now().naive_utc());
        Self {
            id: domain.id.unwrap_or_default(),
            user_id: domain.user_id,
            name: domain.name,
            kind: domain.kind.as_str().to_string(),
            balance: domain
                .balance
                .filter(|_| domain.kind.has_stored_balance())
                .unwrap_or_default()
                .to_string(),
            credit_limit: domain.credit_limit.map(|v| v.to_string()),
            billing_day: domain.billing_day.map(|d| d as i32),
            due_day: domain.due_day.map(|d| d as i32),
            shares: None,
            cost_price: None,
            current_net_value: domain.current_net_value.map(|v| v.to_string()),
            is_active: domain.is_active,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
