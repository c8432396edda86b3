use crate::db::Db;
use crate::error::Res;
use crate::model::{Amount, Budget, BudgetChanges, NewBudget};
use anyhow::Context;

#[derive(sqlx::FromRow)]
struct BudgetRow {
    id: i64,
    category: String,
    maximum: String,
    theme: String,
}

impl BudgetRow {
    fn into_model(self) -> Res<Budget> {
        Ok(Budget {
            id: self.id,
            category: self.category,
            maximum: Amount::from_sql(&self.maximum)?,
            theme: self.theme,
        })
    }
}

impl Db {
    pub(crate) async fn list_budgets(&self) -> Res<Vec<Budget>> {
        let rows: Vec<BudgetRow> =
            sqlx::query_as("SELECT id, category, maximum, theme FROM budgets ORDER BY id")
                .fetch_all(self.pool())
                .await
                .context("Unable to list budgets")?;
        rows.into_iter().map(BudgetRow::into_model).collect()
    }

    pub(crate) async fn get_budget(&self, id: i64) -> Res<Option<Budget>> {
        let row: Option<BudgetRow> =
            sqlx::query_as("SELECT id, category, maximum, theme FROM budgets WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .with_context(|| format!("Unable to get budget {id}"))?;
        row.map(BudgetRow::into_model).transpose()
    }

    pub(crate) async fn insert_budget(&self, budget: &NewBudget) -> Res<Budget> {
        let row: BudgetRow = sqlx::query_as(
            "INSERT INTO budgets (category, maximum, theme) VALUES (?, ?, ?) \
             RETURNING id, category, maximum, theme",
        )
        .bind(&budget.category)
        .bind(budget.maximum.to_sql())
        .bind(&budget.theme)
        .fetch_one(self.pool())
        .await
        .context("Unable to insert budget")?;
        row.into_model()
    }

    pub(crate) async fn update_budget(
        &self,
        id: i64,
        changes: &BudgetChanges,
    ) -> Res<Option<Budget>> {
        let row: Option<BudgetRow> = sqlx::query_as(
            "UPDATE budgets SET \
                category = COALESCE(?, category), \
                maximum = COALESCE(?, maximum), \
                theme = COALESCE(?, theme), \
                updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now') \
             WHERE id = ? \
             RETURNING id, category, maximum, theme",
        )
        .bind(&changes.category)
        .bind(changes.maximum.map(Amount::to_sql))
        .bind(&changes.theme)
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .with_context(|| format!("Unable to update budget {id}"))?;
        row.map(BudgetRow::into_model).transpose()
    }

    pub(crate) async fn delete_budget(&self, id: i64) -> Res<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .with_context(|| format!("Unable to delete budget {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}
