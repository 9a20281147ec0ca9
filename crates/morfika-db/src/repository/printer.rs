//! # Printer Repository
//!
//! Database operations for printer cost profiles.
//!
//! Editing a profile changes the recomputed figures of every quotation whose
//! pieces reference it; nothing is snapshotted. Deleting a profile leaves the
//! referencing pieces in place with `printer_id = NULL`.

use chrono::Utc;
use morfika_core::validation::validate_printer;
use morfika_core::{Money, PrinterConfig, RecordId};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{format_timestamp, parse_decimal, parse_uuid};
use crate::error::{DbError, DbResult};

/// Raw `printers` row.
#[derive(Debug, FromRow)]
struct PrinterRow {
    id: String,
    name: String,
    power_draw_watts: String,
    energy_unit_cost: String,
    machine_minute_cost: String,
}

impl TryFrom<PrinterRow> for PrinterConfig {
    type Error = DbError;

    fn try_from(row: PrinterRow) -> DbResult<Self> {
        Ok(PrinterConfig {
            id: RecordId::Existing(parse_uuid("printers.id", &row.id)?),
            name: row.name,
            power_draw_watts: parse_decimal("printers.power_draw_watts", &row.power_draw_watts)?,
            energy_unit_cost: Money::new(parse_decimal(
                "printers.energy_unit_cost",
                &row.energy_unit_cost,
            )?),
            machine_minute_cost: Money::new(parse_decimal(
                "printers.machine_minute_cost",
                &row.machine_minute_cost,
            )?),
        })
    }
}

/// Repository for printer database operations.
#[derive(Debug, Clone)]
pub struct PrinterRepository {
    pool: SqlitePool,
}

impl PrinterRepository {
    /// Creates a new PrinterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PrinterRepository { pool }
    }

    /// All printers, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<PrinterConfig>> {
        let rows: Vec<PrinterRow> = sqlx::query_as(
            r#"
            SELECT id, name, power_draw_watts, energy_unit_cost, machine_minute_cost
            FROM printers
            ORDER BY name COLLATE NOCASE, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded printers");
        rows.into_iter().map(PrinterConfig::try_from).collect()
    }

    /// Gets a printer by ID.
    pub async fn get_by_id(&self, id: Uuid) -> DbResult<Option<PrinterConfig>> {
        let row: Option<PrinterRow> = sqlx::query_as(
            r#"
            SELECT id, name, power_draw_watts, energy_unit_cost, machine_minute_cost
            FROM printers
            WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(PrinterConfig::try_from).transpose()
    }

    /// Inserts a new printer, or updates the one its id names.
    pub async fn upsert(&self, printer: &PrinterConfig) -> DbResult<Uuid> {
        validate_printer(printer)?;
        match printer.id {
            RecordId::New => self.insert(printer).await,
            RecordId::Existing(id) => {
                self.update(id, printer).await?;
                Ok(id)
            }
        }
    }

    async fn insert(&self, printer: &PrinterConfig) -> DbResult<Uuid> {
        let id = Uuid::new_v4();
        let now = format_timestamp(&Utc::now());
        debug!(id = %id, name = %printer.name, "Inserting printer");

        sqlx::query(
            r#"
            INSERT INTO printers (
                id, name, power_draw_watts, energy_unit_cost, machine_minute_cost,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(id.to_string())
        .bind(&printer.name)
        .bind(printer.power_draw_watts.to_string())
        .bind(printer.energy_unit_cost.amount().to_string())
        .bind(printer.machine_minute_cost.amount().to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, id: Uuid, printer: &PrinterConfig) -> DbResult<()> {
        debug!(id = %id, "Updating printer");

        let result = sqlx::query(
            r#"
            UPDATE printers SET
                name = ?1,
                power_draw_watts = ?2,
                energy_unit_cost = ?3,
                machine_minute_cost = ?4,
                updated_at = ?5
            WHERE id = ?6
            "#,
        )
        .bind(&printer.name)
        .bind(printer.power_draw_watts.to_string())
        .bind(printer.energy_unit_cost.amount().to_string())
        .bind(printer.machine_minute_cost.amount().to_string())
        .bind(format_timestamp(&Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::printer_not_found(id));
        }
        Ok(())
    }

    /// Deletes a printer. Referencing pieces become unassigned.
    pub async fn delete(&self, id: Uuid) -> DbResult<()> {
        debug!(id = %id, "Deleting printer");

        let result = sqlx::query("DELETE FROM printers WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::printer_not_found(id));
        }
        Ok(())
    }

    /// Number of stored printers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM printers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal_macros::dec;

    async fn test_repo() -> PrinterRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().printers()
    }

    fn printer(name: &str) -> PrinterConfig {
        PrinterConfig::new(name, dec!(400), Money::new(dec!(907.5)), Money::from_units(25))
    }

    #[tokio::test]
    async fn test_insert_and_list_sorted_by_name() {
        let repo = test_repo().await;
        repo.upsert(&printer("Prusa MK4")).await.unwrap();
        repo.upsert(&printer("bambu A1")).await.unwrap();
        repo.upsert(&printer("Ender 3")).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["bambu A1", "Ender 3", "Prusa MK4"]);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_decimals_survive_storage() {
        let repo = test_repo().await;
        let id = repo.upsert(&printer("Ender 3")).await.unwrap();

        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.id, RecordId::Existing(id));
        assert_eq!(stored.energy_unit_cost.amount(), dec!(907.5));
        assert_eq!(stored.power_draw_watts, dec!(400));
    }

    #[tokio::test]
    async fn test_update_existing() {
        let repo = test_repo().await;
        let id = repo.upsert(&printer("Ender 3")).await.unwrap();

        let mut edited = repo.get_by_id(id).await.unwrap().unwrap();
        edited.machine_minute_cost = Money::from_units(40);
        assert_eq!(repo.upsert(&edited).await.unwrap(), id);

        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.machine_minute_cost.amount(), dec!(40));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let repo = test_repo().await;
        let ghost = PrinterConfig {
            id: RecordId::Existing(Uuid::new_v4()),
            ..printer("Ghost")
        };
        assert!(matches!(repo.upsert(&ghost).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        let repo = test_repo().await;
        assert!(matches!(
            repo.upsert(&printer("   ")).await,
            Err(DbError::Validation(_))
        ));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = test_repo().await;
        let id = repo.upsert(&printer("Ender 3")).await.unwrap();

        repo.delete(id).await.unwrap();
        assert!(repo.get_by_id(id).await.unwrap().is_none());
        assert!(matches!(repo.delete(id).await, Err(DbError::NotFound { .. })));
    }
}
