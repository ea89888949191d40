use std::sync::Arc;

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;

use kakebo_core::db::{DbConnection, DbPool};
use kakebo_core::errors::{Error, LedgerError, Result};
use kakebo_core::transactions::{Transaction, TransactionKind, TransactionRepositoryTrait};

use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::transactions;
use crate::utils::{format_date, parse_decimal};

use super::model::TransactionDB;

/// Repository for managing transaction rows in the database.
pub struct TransactionRepository {
    pool: Arc<DbPool>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn load(
        user_id: &str,
        transaction_id: &str,
        conn: &mut diesel::sqlite::SqliteConnection,
    ) -> Result<Transaction> {
        let row = transactions::table
            .filter(transactions::id.eq(transaction_id))
            .filter(transactions::user_id.eq(user_id))
            .select(TransactionDB::as_select())
            .first::<TransactionDB>(conn)
            .optional()
            .into_core()?
            .ok_or_else(|| {
                Error::Ledger(LedgerError::NotFound {
                    entity: "transaction",
                    id: transaction_id.to_string(),
                })
            })?;
        row.try_into()
    }
}

impl TransactionRepositoryTrait for TransactionRepository {
    fn insert_in_tx(
        &self,
        transaction: Transaction,
        conn: &mut DbConnection,
    ) -> Result<Transaction> {
        let row = TransactionDB::from(&transaction);
        diesel::insert_into(transactions::table)
            .values(&row)
            .execute(conn)
            .into_core()?;
        Ok(transaction)
    }

    fn update_in_tx(
        &self,
        transaction: &Transaction,
        conn: &mut DbConnection,
    ) -> Result<Transaction> {
        let row = TransactionDB::from(transaction);
        let updated = diesel::update(transactions::table.find(&row.id))
            .set(&row)
            .execute(conn)
            .into_core()?;
        if updated == 0 {
            return Err(Error::Ledger(LedgerError::NotFound {
                entity: "transaction",
                id: transaction.id.clone(),
            }));
        }
        Ok(transaction.clone())
    }

    fn delete_in_tx(&self, transaction_id: &str, conn: &mut DbConnection) -> Result<usize> {
        diesel::delete(transactions::table.find(transaction_id))
            .execute(conn)
            .into_core()
    }

    fn find_in_tx(
        &self,
        user_id: &str,
        transaction_id: &str,
        conn: &mut DbConnection,
    ) -> Result<Transaction> {
        Self::load(user_id, transaction_id, conn)
    }

    fn get_by_id(&self, user_id: &str, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        Self::load(user_id, transaction_id, &mut conn)
    }

    fn list(
        &self,
        user_id: &str,
        account_id: Option<&str>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = transactions::table
            .filter(transactions::user_id.eq(user_id))
            .into_boxed();
        if let Some(account_id) = account_id {
            query = query.filter(transactions::account_id.eq(account_id));
        }
        if let Some(from) = from {
            query = query.filter(transactions::date.ge(format_date(from)));
        }
        if let Some(to) = to {
            query = query.filter(transactions::date.le(format_date(to)));
        }

        let rows = query
            .select(TransactionDB::as_select())
            .order((transactions::date.desc(), transactions::created_at.desc()))
            .load::<TransactionDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Sums are computed over the exact decimal text in Rust rather than via
    /// SQL aggregation, which would coerce the TEXT column to floating point.
    fn sum_amount_by_kind(&self, account_id: &str, kind: TransactionKind) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)?;

        let amounts: Vec<String> = transactions::table
            .filter(transactions::account_id.eq(account_id))
            .filter(transactions::kind.eq(kind.as_str()))
            .select(transactions::amount)
            .load::<String>(&mut conn)
            .into_core()?;

        Ok(amounts
            .iter()
            .map(|a| parse_decimal(a, "transaction.amount"))
            .sum())
    }

    fn sum_refunds_for_in_tx(
        &self,
        original_transaction_id: &str,
        conn: &mut DbConnection,
    ) -> Result<Decimal> {
        let amounts: Vec<String> = transactions::table
            .filter(transactions::original_transaction_id.eq(original_transaction_id))
            .filter(transactions::kind.eq(TransactionKind::Refund.as_str()))
            .select(transactions::amount)
            .load::<String>(conn)
            .into_core()?;

        Ok(amounts
            .iter()
            .map(|a| parse_decimal(a, "transaction.amount"))
            .sum())
    }
}
