//! Database model for ledger transactions.

use std::str::FromStr;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kakebo_core::errors::{Error, Result};
use kakebo_core::transactions::{Transaction, TransactionKind};

use crate::utils::{format_date, format_datetime, parse_date, parse_datetime, parse_decimal};

/// Database model for transactions.
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
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub category_id: Option<String>,
    pub kind: String,
    pub amount: String,
    pub date: String,
    pub source_account_id: Option<String>,
    pub original_transaction_id: Option<String>,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = Error;

    fn try_from(db: TransactionDB) -> Result<Transaction> {
        Ok(Transaction {
            kind: TransactionKind::from_str(&db.kind)?,
            amount: parse_decimal(&db.amount, "transaction.amount"),
            date: parse_date(&db.date, "transaction.date"),
            created_at: parse_datetime(&db.created_at, "transaction.createdAt"),
            updated_at: parse_datetime(&db.updated_at, "transaction.updatedAt"),
            id: db.id,
            user_id: db.user_id,
            account_id: db.account_id,
            category_id: db.category_id,
            source_account_id: db.source_account_id,
            original_transaction_id: db.original_transaction_id,
            note: db.note,
        })
    }
}

impl From<&Transaction> for TransactionDB {
    fn from(domain: &Transaction) -> Self {
        Self {
            id: domain.id.clone(),
            user_id: domain.user_id.clone(),
            account_id: domain.account_id.clone(),
            category_id: domain.category_id.clone(),
            kind: domain.kind.as_str().to_string(),
            amount: domain.amount.to_string(),
            date: format_date(domain.date),
            source_account_id: domain.source_account_id.clone(),
            original_transaction_id: domain.original_transaction_id.clone(),
            note: domain.note.clone(),
            created_at: format_datetime(domain.created_at),
            updated_at: format_datetime(domain.updated_at),
        }
    }
}
