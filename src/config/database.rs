//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables
//! are generated from the entity definitions via
//! `Schema::create_table_from_entity`, so the database schema always matches
//! the Rust struct definitions without manual SQL.

use crate::entities::{
    Cycle, CycleDay, Group, GroupMember, Membership, Payment, PaymentEvent, VerificationCode,
    WalletEntry,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database using the `DATABASE_URL`
/// environment variable, falling back to a local `SQLite` file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/gie_invest.sqlite".to_string());

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables from the entity definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let group_table = schema.create_table_from_entity(Group);
    let member_table = schema.create_table_from_entity(GroupMember);
    let membership_table = schema.create_table_from_entity(Membership);
    let cycle_table = schema.create_table_from_entity(Cycle);
    let cycle_day_table = schema.create_table_from_entity(CycleDay);
    let wallet_entry_table = schema.create_table_from_entity(WalletEntry);
    let payment_table = schema.create_table_from_entity(Payment);
    let payment_event_table = schema.create_table_from_entity(PaymentEvent);
    let verification_code_table = schema.create_table_from_entity(VerificationCode);

    db.execute(builder.build(&group_table)).await?;
    db.execute(builder.build(&member_table)).await?;
    db.execute(builder.build(&membership_table)).await?;
    db.execute(builder.build(&cycle_table)).await?;
    db.execute(builder.build(&cycle_day_table)).await?;
    db.execute(builder.build(&wallet_entry_table)).await?;
    db.execute(builder.build(&payment_table)).await?;
    db.execute(builder.build(&payment_event_table)).await?;
    db.execute(builder.build(&verification_code_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Group, GroupModel, Payment, PaymentModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Tables exist if we can query them
        let _: Vec<GroupModel> = Group::find().limit(1).all(&db).await?;
        let _: Vec<PaymentModel> = Payment::find().limit(1).all(&db).await?;

        Ok(())
    }
}
