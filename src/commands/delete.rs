//! Delete command handler.

use crate::args::{Entity, EntityIdArgs};
use crate::commands::list::not_found;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};

/// Deletes one record. Nothing else is touched: deleting a transaction only changes the budgets
/// whose category it matched, and deleting a budget leaves its transactions alone.
///
/// # Errors
/// - `NotFound` if there is no such record.
pub async fn delete(config: Config, args: EntityIdArgs) -> Result<Out<()>> {
    let db = config.db();
    let id = args.id;
    let (deleted, kind) = match args.entity {
        Entity::Transactions => (db.delete_transaction(id).await, "Transaction"),
        Entity::Budgets => (db.delete_budget(id).await, "Budget"),
        Entity::Pots => (db.delete_pot(id).await, "Pot"),
        Entity::Bills => (db.delete_bill(id).await, "Recurring bill"),
    };
    if !deleted.pub_result(ErrorType::Database)? {
        return Err(not_found(kind, id));
    }
    Ok(format!("Deleted {} {id}", kind.to_lowercase()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::IdArgs;
    use crate::commands::{get_pot, list_budgets};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_delete_pot() {
        let env = TestEnv::seeded().await;
        let out = delete(
            env.config(),
            EntityIdArgs {
                entity: Entity::Pots,
                id: 1,
            },
        )
        .await
        .unwrap();
        assert_eq!(out.message(), "Deleted pot 1");
        let err = get_pot(env.config(), IdArgs { id: 1 }).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let env = TestEnv::seeded().await;
        let args = EntityIdArgs {
            entity: Entity::Bills,
            id: 2,
        };
        delete(env.config(), args.clone()).await.unwrap();
        let err = delete(env.config(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
        assert_eq!(err.to_string(), "Recurring bill 2 was not found");
    }

    #[tokio::test]
    async fn test_deleting_expenses_changes_matching_budget_only() {
        let env = TestEnv::seeded().await;
        let db = env.config().db().clone();
        let before = list_budgets(env.config()).await.unwrap().into_structure().unwrap();
        for t in db.list_transactions().await.unwrap() {
            if t.category == "Dining Out" {
                let args = EntityIdArgs {
                    entity: Entity::Transactions,
                    id: t.id,
                };
                delete(env.config(), args).await.unwrap();
            }
        }
        let after = list_budgets(env.config()).await.unwrap().into_structure().unwrap();
        for (b, a) in before.iter().zip(after.iter()) {
            if a.budget.category == "Dining Out" {
                assert!(a.current.is_zero());
            } else {
                assert_eq!(a.current, b.current);
            }
        }
    }
}
