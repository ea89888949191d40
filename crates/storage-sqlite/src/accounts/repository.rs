use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use rust_decimal::Decimal;

use kakebo_core::accounts::{Account, AccountRepositoryTrait, AccountUpdate, NewAccount};
use kakebo_core::db::{DbConnection, DbPool};
use kakebo_core::errors::{Error, LedgerError, Result};

use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::accounts;
use crate::utils::format_datetime;

use super::model::AccountDB;

/// Repository for managing account data in the database.
pub struct AccountRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AccountRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn load(
        user_id: &str,
        account_id: &str,
        conn: &mut diesel::sqlite::SqliteConnection,
    ) -> Result<Account> {
        let row = accounts::table
            .filter(accounts::id.eq(account_id))
            .filter(accounts::user_id.eq(user_id))
            .select(AccountDB::as_select())
            .first::<AccountDB>(conn)
            .optional()
            .into_core()?
            .ok_or_else(|| {
                Error::Ledger(LedgerError::NotFound {
                    entity: "account",
                    id: account_id.to_string(),
                })
            })?;
        row.try_into()
    }

    fn load_unscoped(
        account_id: &str,
        conn: &mut diesel::sqlite::SqliteConnection,
    ) -> Result<AccountDB> {
        accounts::table
            .filter(accounts::id.eq(account_id))
            .select(AccountDB::as_select())
            .first::<AccountDB>(conn)
            .optional()
            .into_core()?
            .ok_or_else(|| {
                Error::Ledger(LedgerError::NotFound {
                    entity: "account",
                    id: account_id.to_string(),
                })
            })
    }
}

#[async_trait]
impl AccountRepositoryTrait for AccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;

        let mut account_db: AccountDB = new_account.into();
        if account_db.id.is_empty() {
            account_db.id = uuid::Uuid::new_v4().to_string();
        }

        self.writer
            .exec(move |conn| {
                diesel::insert_into(accounts::table)
                    .values(&account_db)
                    .execute(conn)
                    .into_core()?;
                account_db.try_into()
            })
            .await
    }

    async fn update(&self, account_update: AccountUpdate) -> Result<Account> {
        account_update.validate()?;

        self.writer
            .exec(move |conn| {
                let mut existing = Self::load_unscoped(&account_update.id, conn)?;
                if existing.user_id != account_update.user_id {
                    return Err(Error::Ledger(LedgerError::NotFound {
                        entity: "account",
                        id: account_update.id.clone(),
                    }));
                }

                existing.name = account_update.name.clone();
                existing.credit_limit = account_update.credit_limit.map(|v| v.to_string());
                existing.billing_day = account_update.billing_day.map(|d| d as i32);
                existing.due_day = account_update.due_day.map(|d| d as i32);
                existing.is_active = account_update.is_active;
                existing.updated_at = format_datetime(chrono::Utc::now().naive_utc());

                diesel::update(accounts::table.find(&existing.id))
                    .set(&existing)
                    .execute(conn)
                    .into_core()?;

                existing.try_into()
            })
            .await
    }

    fn get_by_id(&self, user_id: &str, account_id: &str) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;
        Self::load(user_id, account_id, &mut conn)
    }

    fn list(&self, user_id: &str, is_active_filter: Option<bool>) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = accounts::table
            .filter(accounts::user_id.eq(user_id))
            .into_boxed();
        if let Some(active) = is_active_filter {
            query = query.filter(accounts::is_active.eq(active));
        }

        let rows = query
            .select(AccountDB::as_select())
            .order((accounts::is_active.desc(), accounts::name.asc()))
            .load::<AccountDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(Account::try_from).collect()
    }

    /// Loads a row inside the caller's transaction. SQLite's writer lock
    /// plus the transaction make the subsequent read-modify-write atomic;
    /// callers keep the ascending-id acquisition order for portability to
    /// row-locking backends.
    fn find_for_update(
        &self,
        user_id: &str,
        account_id: &str,
        conn: &mut DbConnection,
    ) -> Result<Account> {
        Self::load(user_id, account_id, conn)
    }

    fn adjust_balance_in_tx(
        &self,
        account_id: &str,
        delta: Decimal,
        conn: &mut DbConnection,
    ) -> Result<Account> {
        let db = Self::load_unscoped(account_id, conn)?;
        let account: Account = db.try_into()?;
        let new_balance = account.balance + delta;

        diesel::update(accounts::table.find(account_id))
            .set((
                accounts::balance.eq(new_balance.to_string()),
                accounts::updated_at.eq(format_datetime(chrono::Utc::now().naive_utc())),
            ))
            .execute(conn)
            .into_core()?;

        Ok(Account {
            balance: new_balance,
            ..account
        })
    }

    fn set_balance_in_tx(
        &self,
        account_id: &str,
        balance: Decimal,
        conn: &mut DbConnection,
    ) -> Result<()> {
        let updated = diesel::update(accounts::table.find(account_id))
            .set((
                accounts::balance.eq(balance.to_string()),
                accounts::updated_at.eq(format_datetime(chrono::Utc::now().naive_utc())),
            ))
            .execute(conn)
            .into_core()?;
        if updated == 0 {
            return Err(Error::Ledger(LedgerError::NotFound {
                entity: "account",
                id: account_id.to_string(),
            }));
        }
        Ok(())
    }

    fn update_position_in_tx(
        &self,
        account_id: &str,
        shares: Decimal,
        cost_price: Decimal,
        net_value: Decimal,
        balance: Decimal,
        conn: &mut DbConnection,
    ) -> Result<()> {
        let updated = diesel::update(accounts::table.find(account_id))
            .set((
                accounts::shares.eq(Some(shares.to_string())),
                accounts::cost_price.eq(Some(cost_price.to_string())),
                accounts::current_net_value.eq(Some(net_value.to_string())),
                accounts::balance.eq(balance.to_string()),
                accounts::updated_at.eq(format_datetime(chrono::Utc::now().naive_utc())),
            ))
            .execute(conn)
            .into_core()?;
        if updated == 0 {
            return Err(Error::Ledger(LedgerError::NotFound {
                entity: "account",
                id: account_id.to_string(),
            }));
        }
        Ok(())
    }
}
