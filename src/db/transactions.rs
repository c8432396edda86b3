use crate::db::Db;
use crate::error::Res;
use crate::model::{Amount, NewTransaction, Transaction, TransactionChanges};
use anyhow::Context;
use chrono::NaiveDate;

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    name: String,
    category: String,
    amount: String,
    date: String,
    avatar: Option<String>,
    is_recurring: bool,
}

impl TransactionRow {
    fn into_model(self) -> Res<Transaction> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}' stored for transaction {}", self.date, self.id))?;
        Ok(Transaction {
            id: self.id,
            name: self.name,
            category: self.category,
            amount: Amount::from_sql(&self.amount)?,
            date,
            avatar: self.avatar,
            is_recurring: self.is_recurring,
        })
    }
}

fn convert(rows: Vec<TransactionRow>) -> Res<Vec<Transaction>> {
    rows.into_iter().map(TransactionRow::into_model).collect()
}

fn sql_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl Db {
    /// All transactions, newest first.
    pub(crate) async fn list_transactions(&self) -> Res<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            "SELECT id, name, category, amount, date, avatar, is_recurring \
             FROM transactions ORDER BY date DESC, id DESC",
        )
        .fetch_all(self.pool())
        .await
        .context("Unable to list transactions")?;
        convert(rows)
    }

    pub(crate) async fn get_transaction(&self, id: i64) -> Res<Option<Transaction>> {
        let row: Option<TransactionRow> = sqlx::query_as(
            "SELECT id, name, category, amount, date, avatar, is_recurring \
             FROM transactions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .with_context(|| format!("Unable to get transaction {id}"))?;
        row.map(TransactionRow::into_model).transpose()
    }

    pub(crate) async fn insert_transaction(&self, txn: &NewTransaction) -> Res<Transaction> {
        let row: TransactionRow = sqlx::query_as(
            "INSERT INTO transactions (name, category, amount, date, avatar, is_recurring) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING id, name, category, amount, date, avatar, is_recurring",
        )
        .bind(&txn.name)
        .bind(&txn.category)
        .bind(txn.amount.to_sql())
        .bind(sql_date(txn.date))
        .bind(&txn.avatar)
        .bind(txn.is_recurring)
        .fetch_one(self.pool())
        .await
        .context("Unable to insert transaction")?;
        row.into_model()
    }

    /// Applies `changes` and returns the updated row, or `None` if there is no such transaction.
    pub(crate) async fn update_transaction(
        &self,
        id: i64,
        changes: &TransactionChanges,
    ) -> Res<Option<Transaction>> {
        let row: Option<TransactionRow> = sqlx::query_as(
            "UPDATE transactions SET \
                name = COALESCE(?, name), \
                category = COALESCE(?, category), \
                amount = COALESCE(?, amount), \
                date = COALESCE(?, date), \
                avatar = COALESCE(?, avatar), \
                is_recurring = COALESCE(?, is_recurring), \
                updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now') \
             WHERE id = ? \
             RETURNING id, name, category, amount, date, avatar, is_recurring",
        )
        .bind(&changes.name)
        .bind(&changes.category)
        .bind(changes.amount.map(Amount::to_sql))
        .bind(changes.date.map(sql_date))
        .bind(&changes.avatar)
        .bind(changes.is_recurring)
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .with_context(|| format!("Unable to update transaction {id}"))?;
        row.map(TransactionRow::into_model).transpose()
    }

    /// Returns `false` if there was no such transaction.
    pub(crate) async fn delete_transaction(&self, id: i64) -> Res<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .with_context(|| format!("Unable to delete transaction {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Amount, NewTransaction, TransactionChanges};
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn new_txn(name: &str, amount: &str, date: &str) -> NewTransaction {
        NewTransaction {
            name: name.to_string(),
            category: "General".to_string(),
            amount: Amount::from_str(amount).unwrap(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            avatar: format!("https://example.com/{name}.png"),
            is_recurring: false,
        }
    }

    #[tokio::test]
    async fn test_amounts_are_exact() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        let txn = db
            .insert_transaction(&new_txn("a", "-0.10", "2024-08-01"))
            .await
            .unwrap();
        let found = db.get_transaction(txn.id).await.unwrap().unwrap();
        assert_eq!(found.amount.to_sql(), "-0.10");
        assert_eq!(found, txn);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        db.insert_transaction(&new_txn("old", "1", "2024-08-01")).await.unwrap();
        db.insert_transaction(&new_txn("new", "1", "2024-08-19")).await.unwrap();
        db.insert_transaction(&new_txn("same-day", "1", "2024-08-19")).await.unwrap();

        let names: Vec<String> = db
            .list_transactions()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["same-day", "new", "old"]);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        let txn = db
            .insert_transaction(&new_txn("a", "-5", "2024-08-01"))
            .await
            .unwrap();
        let changes = TransactionChanges {
            category: Some("Dining Out".to_string()),
            is_recurring: Some(true),
            ..Default::default()
        };
        let updated = db.update_transaction(txn.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.category, "Dining Out");
        assert!(updated.is_recurring);
        assert_eq!(updated.name, "a");
        assert_eq!(updated.amount, txn.amount);

        assert!(db.update_transaction(9999, &changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let env = TestEnv::new().await;
        let db = env.config().db().clone();
        let txn = db
            .insert_transaction(&new_txn("a", "-5", "2024-08-01"))
            .await
            .unwrap();
        assert!(db.delete_transaction(txn.id).await.unwrap());
        assert!(!db.delete_transaction(txn.id).await.unwrap());
        assert!(db.get_transaction(txn.id).await.unwrap().is_none());
    }
}
