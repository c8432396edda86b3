use crate::db::Db;
use crate::error::Res;
use crate::model::{Amount, NewPot, Pot, PotChanges, PotMovement};
use anyhow::Context;
use tracing::debug;

#[derive(sqlx::FromRow)]
struct PotRow {
    id: i64,
    name: String,
    target: String,
    total: String,
    theme: String,
}

impl PotRow {
    fn into_model(self) -> Res<Pot> {
        Ok(Pot {
            id: self.id,
            name: self.name,
            target: Amount::from_sql(&self.target)?,
            total: Amount::from_sql(&self.total)?,
            theme: self.theme,
        })
    }
}

impl Db {
    pub(crate) async fn list_pots(&self) -> Res<Vec<Pot>> {
        let rows: Vec<PotRow> =
            sqlx::query_as("SELECT id, name, target, total, theme FROM pots ORDER BY id")
                .fetch_all(self.pool())
                .await
                .context("Unable to list pots")?;
        rows.into_iter().map(PotRow::into_model).collect()
    }

    pub(crate) async fn get_pot(&self, id: i64) -> Res<Option<Pot>> {
        let row: Option<PotRow> =
            sqlx::query_as("SELECT id, name, target, total, theme FROM pots WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .with_context(|| format!("Unable to get pot {id}"))?;
        row.map(PotRow::into_model).transpose()
    }

    /// New pots always start with a total of zero.
    pub(crate) async fn insert_pot(&self, pot: &NewPot) -> Res<Pot> {
        let row: PotRow = sqlx::query_as(
            "INSERT INTO pots (name, target, total, theme) VALUES (?, ?, ?, ?) \
             RETURNING id, name, target, total, theme",
        )
        .bind(&pot.name)
        .bind(pot.target.to_sql())
        .bind(Amount::ZERO.to_sql())
        .bind(&pot.theme)
        .fetch_one(self.pool())
        .await
        .context("Unable to insert pot")?;
        row.into_model()
    }

    pub(crate) async fn update_pot(&self, id: i64, changes: &PotChanges) -> Res<Option<Pot>> {
        let row: Option<PotRow> = sqlx::query_as(
            "UPDATE pots SET \
                name = COALESCE(?, name), \
                target = COALESCE(?, target), \
                total = COALESCE(?, total), \
                theme = COALESCE(?, theme), \
                updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now') \
             WHERE id = ? \
             RETURNING id, name, target, total, theme",
        )
        .bind(&changes.name)
        .bind(changes.target.map(Amount::to_sql))
        .bind(changes.total.map(Amount::to_sql))
        .bind(&changes.theme)
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .with_context(|| format!("Unable to update pot {id}"))?;
        row.map(PotRow::into_model).transpose()
    }

    /// Reads the pot, applies `movement` and writes the new total in one SQL transaction. Returns
    /// `None` if there is no such pot.
    ///
    /// The write lock is taken up front, so concurrent movements on one pot run one after another.
    pub(crate) async fn move_pot_funds(&self, id: i64, movement: PotMovement) -> Res<Option<Pot>> {
        let mut tx = self
            .pool()
            .begin_with("BEGIN IMMEDIATE")
            .await
            .context("Unable to begin a transaction")?;

        let row: Option<PotRow> =
            sqlx::query_as("SELECT id, name, target, total, theme FROM pots WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .with_context(|| format!("Unable to get pot {id}"))?;
        let Some(pot) = row.map(PotRow::into_model).transpose()? else {
            return Ok(None);
        };

        let total = movement.apply(pot.total);
        debug!("Pot {id} total {} -> {} ({movement:?})", pot.total, total);
        let row: PotRow = sqlx::query_as(
            "UPDATE pots SET total = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now') \
             WHERE id = ? \
             RETURNING id, name, target, total, theme",
        )
        .bind(total.to_sql())
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("Unable to update the total of pot {id}"))?;

        tx.commit().await.context("Unable to commit the pot update")?;
        row.into_model().map(Some)
    }

    pub(crate) async fn delete_pot(&self, id: i64) -> Res<bool> {
        let result = sqlx::query("DELETE FROM pots WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .with_context(|| format!("Unable to delete pot {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}
