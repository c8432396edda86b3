use crate::db::Db;
use crate::error::Res;
use crate::model::{Amount, BillChanges, BillStatus, NewBill, RecurringBill};
use anyhow::Context;

#[derive(sqlx::FromRow)]
struct BillRow {
    id: i64,
    name: String,
    amount: String,
    due_day: i64,
    status: String,
    logo: Option<String>,
    theme: String,
}

impl BillRow {
    fn into_model(self) -> Res<RecurringBill> {
        let status = self.status.parse::<BillStatus>()
            .with_context(|| format!("Invalid status '{}' stored for bill {}", self.status, self.id))?;
        let due_day = u8::try_from(self.due_day)
            .with_context(|| format!("Invalid due day {} stored for bill {}", self.due_day, self.id))?;
        Ok(RecurringBill {
            id: self.id,
            name: self.name,
            amount: Amount::from_sql(&self.amount)?,
            due_day,
            status,
            logo: self.logo,
            theme: self.theme,
        })
    }
}

impl Db {
    /// All bills in the order they fall due within a month.
    pub(crate) async fn list_bills(&self) -> Res<Vec<RecurringBill>> {
        let rows: Vec<BillRow> = sqlx::query_as(
            "SELECT id, name, amount, due_day, status, logo, theme \
             FROM recurring_bills ORDER BY due_day, id",
        )
        .fetch_all(self.pool())
        .await
        .context("Unable to list recurring bills")?;
        rows.into_iter().map(BillRow::into_model).collect()
    }

    pub(crate) async fn get_bill(&self, id: i64) -> Res<Option<RecurringBill>> {
        let row: Option<BillRow> = sqlx::query_as(
            "SELECT id, name, amount, due_day, status, logo, theme \
             FROM recurring_bills WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .with_context(|| format!("Unable to get recurring bill {id}"))?;
        row.map(BillRow::into_model).transpose()
    }

    pub(crate) async fn insert_bill(&self, bill: &NewBill) -> Res<RecurringBill> {
        let row: BillRow = sqlx::query_as(
            "INSERT INTO recurring_bills (name, amount, due_day, status, logo, theme) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING id, name, amount, due_day, status, logo, theme",
        )
        .bind(&bill.name)
        .bind(bill.amount.to_sql())
        .bind(i64::from(bill.due_day))
        .bind(bill.status.to_string())
        .bind(&bill.logo)
        .bind(&bill.theme)
        .fetch_one(self.pool())
        .await
        .context("Unable to insert recurring bill")?;
        row.into_model()
    }

    pub(crate) async fn update_bill(
        &self,
        id: i64,
        changes: &BillChanges,
    ) -> Res<Option<RecurringBill>> {
        let (set_logo, logo) = match &changes.logo {
            Some(logo) => (true, logo.clone()),
            None => (false, None),
        };
        let row: Option<BillRow> = sqlx::query_as(
            "UPDATE recurring_bills SET \
                name = COALESCE(?, name), \
                amount = COALESCE(?, amount), \
                due_day = COALESCE(?, due_day), \
                status = COALESCE(?, status), \
                logo = CASE WHEN ? THEN ? ELSE logo END, \
                theme = COALESCE(?, theme), \
                updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now') \
             WHERE id = ? \
             RETURNING id, name, amount, due_day, status, logo, theme",
        )
        .bind(&changes.name)
        .bind(changes.amount.map(Amount::to_sql))
        .bind(changes.due_day.map(i64::from))
        .bind(changes.status.map(|s| s.to_string()))
        .bind(set_logo)
        .bind(logo)
        .bind(&changes.theme)
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .with_context(|| format!("Unable to update recurring bill {id}"))?;
        row.map(BillRow::into_model).transpose()
    }

    pub(crate) async fn delete_bill(&self, id: i64) -> Res<bool> {
        let result = sqlx::query("DELETE FROM recurring_bills WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .with_context(|| format!("Unable to delete recurring bill {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}
