//! # Quotation Repository
//!
//! Database operations for quotations and their items.
//!
//! ## Save Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │  ├── New:      INSERT quotations (created_at = now)                     │
//! │  │   Existing: UPDATE quotations SET client_name  (0 rows → NotFound)   │
//! │  │             DELETE quotation_items WHERE quotation_id = id           │
//! │  ├── SELECT id FROM printers   (dangling printer ids are stored NULL)   │
//! │  └── INSERT quotation_items    (fresh ids, position = list index)       │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Any failure rolls the whole save back, so a header never outlives a
//! failed item write.

use chrono::{DateTime, Utc};
use morfika_core::validation::validate_quotation;
use morfika_core::{Money, PrintPiece, Quotation, RecordId};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{format_timestamp, parse_decimal, parse_timestamp, parse_uuid};
use crate::error::{DbError, DbResult};

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, FromRow)]
struct QuotationRow {
    id: String,
    client_name: String,
    created_at: String,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: String,
    quotation_id: String,
    name: String,
    image_reference: Option<String>,
    material: String,
    material_cost_per_kg: String,
    mass_grams: String,
    print_minutes: String,
    printer_id: Option<String>,
    primer_cost_per_200ml: String,
    primer_consumed_ml: String,
    sanding_paint_cost: String,
    post_processing_minutes: String,
    post_processing_hourly_rate: String,
}

const ITEM_COLUMNS: &str = r#"
    id, quotation_id, name, image_reference, material,
    material_cost_per_kg, mass_grams, print_minutes, printer_id,
    primer_cost_per_200ml, primer_consumed_ml, sanding_paint_cost,
    post_processing_minutes, post_processing_hourly_rate
"#;

fn money(column: &'static str, text: &str) -> DbResult<Money> {
    parse_decimal(column, text).map(Money::new)
}

impl TryFrom<ItemRow> for PrintPiece {
    type Error = DbError;

    fn try_from(row: ItemRow) -> DbResult<Self> {
        let printer_id = row
            .printer_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| parse_uuid("quotation_items.printer_id", id))
            .transpose()?;

        Ok(PrintPiece {
            id: parse_uuid("quotation_items.id", &row.id)?,
            name: row.name,
            image_reference: row.image_reference,
            material: row.material,
            material_cost_per_kg: money("quotation_items.material_cost_per_kg", &row.material_cost_per_kg)?,
            mass_grams: parse_decimal("quotation_items.mass_grams", &row.mass_grams)?,
            print_minutes: parse_decimal("quotation_items.print_minutes", &row.print_minutes)?,
            printer_id,
            primer_cost_per_200ml: money("quotation_items.primer_cost_per_200ml", &row.primer_cost_per_200ml)?,
            primer_consumed_ml: parse_decimal("quotation_items.primer_consumed_ml", &row.primer_consumed_ml)?,
            sanding_paint_cost: money("quotation_items.sanding_paint_cost", &row.sanding_paint_cost)?,
            post_processing_minutes: parse_decimal(
                "quotation_items.post_processing_minutes",
                &row.post_processing_minutes,
            )?,
            post_processing_hourly_rate: money(
                "quotation_items.post_processing_hourly_rate",
                &row.post_processing_hourly_rate,
            )?,
        })
    }
}

fn assemble(row: QuotationRow, pieces: Vec<PrintPiece>) -> DbResult<Quotation> {
    Ok(Quotation {
        id: RecordId::Existing(parse_uuid("quotations.id", &row.id)?),
        client_name: row.client_name,
        pieces,
        created_at: parse_timestamp("quotations.created_at", &row.created_at)?,
    })
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for quotation database operations.
#[derive(Debug, Clone)]
pub struct QuotationRecordRepository {
    pool: SqlitePool,
}

impl QuotationRecordRepository {
    /// Creates a new QuotationRecordRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QuotationRecordRepository { pool }
    }

    /// All quotations with their pieces, newest first.
    pub async fn list(&self) -> DbResult<Vec<Quotation>> {
        let headers: Vec<QuotationRow> = sqlx::query_as(
            r#"
            SELECT id, client_name, created_at
            FROM quotations
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let items: Vec<ItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM quotation_items ORDER BY quotation_id, position",
            ITEM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut pieces_by_quotation: HashMap<String, Vec<PrintPiece>> = HashMap::new();
        for item in items {
            let key = item.quotation_id.clone();
            pieces_by_quotation
                .entry(key)
                .or_default()
                .push(PrintPiece::try_from(item)?);
        }

        debug!(count = headers.len(), "Loaded quotations");

        headers
            .into_iter()
            .map(|row| {
                let pieces = pieces_by_quotation.remove(&row.id).unwrap_or_default();
                assemble(row, pieces)
            })
            .collect()
    }

    /// Gets a quotation and its pieces by ID.
    pub async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Quotation>> {
        let header: Option<QuotationRow> = sqlx::query_as(
            "SELECT id, client_name, created_at FROM quotations WHERE id = ?1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let items: Vec<ItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM quotation_items WHERE quotation_id = ?1 ORDER BY position",
            ITEM_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let pieces = items
            .into_iter()
            .map(PrintPiece::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        assemble(header, pieces).map(Some)
    }

    /// Creates (`RecordId::New`) or fully replaces a quotation.
    ///
    /// New quotations are stamped with the current time; updates keep the
    /// original `created_at` and only change the client name and pieces.
    pub async fn save(&self, quotation: &Quotation) -> DbResult<Uuid> {
        match quotation.id {
            RecordId::New => self.create_at(quotation, Utc::now()).await,
            RecordId::Existing(id) => {
                self.replace(id, quotation).await?;
                Ok(id)
            }
        }
    }

    /// Creates a quotation with an explicit creation time.
    ///
    /// Used by `save` and by the seed binary to backfill history. The
    /// quotation's own id is ignored; a fresh one is returned.
    pub async fn create_at(&self, quotation: &Quotation, created_at: DateTime<Utc>) -> DbResult<Uuid> {
        validate_quotation(quotation)?;

        let id = Uuid::new_v4();
        let stamp = format_timestamp(&created_at);
        debug!(id = %id, pieces = quotation.pieces.len(), "Creating quotation");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO quotations (id, client_name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        )
        .bind(id.to_string())
        .bind(&quotation.client_name)
        .bind(&stamp)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, id, &quotation.pieces).await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn replace(&self, id: Uuid, quotation: &Quotation) -> DbResult<()> {
        validate_quotation(quotation)?;
        debug!(id = %id, pieces = quotation.pieces.len(), "Replacing quotation");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE quotations SET client_name = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(&quotation.client_name)
            .bind(format_timestamp(&Utc::now()))
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::quotation_not_found(id));
        }

        sqlx::query("DELETE FROM quotation_items WHERE quotation_id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, id, &quotation.pieces).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Deletes a quotation; its items go with it (`ON DELETE CASCADE`).
    pub async fn delete(&self, id: Uuid) -> DbResult<()> {
        debug!(id = %id, "Deleting quotation");

        let result = sqlx::query("DELETE FROM quotations WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::quotation_not_found(id));
        }
        Ok(())
    }

    /// Number of stored quotations.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Writes `pieces` in order under `quotation_id`, each with a fresh row id.
async fn insert_items(conn: &mut SqliteConnection, quotation_id: Uuid, pieces: &[PrintPiece]) -> DbResult<()> {
    let known_printers: HashSet<String> = sqlx::query_scalar::<_, String>("SELECT id FROM printers")
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .collect();

    for (position, piece) in pieces.iter().enumerate() {
        let printer_id = piece.printer_id.map(|id| id.to_string());
        let printer_id = match printer_id {
            Some(id) if !known_printers.contains(&id) => {
                // Prices the same as unassigned; the FK would reject it.
                warn!(printer_id = %id, position, "Dropping reference to unknown printer");
                None
            }
            other => other,
        };

        sqlx::query(
            r#"
            INSERT INTO quotation_items (
                id, quotation_id, position, name, image_reference, material,
                material_cost_per_kg, mass_grams, print_minutes, printer_id,
                primer_cost_per_200ml, primer_consumed_ml, sanding_paint_cost,
                post_processing_minutes, post_processing_hourly_rate
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(quotation_id.to_string())
        .bind(position as i64)
        .bind(&piece.name)
        .bind(&piece.image_reference)
        .bind(&piece.material)
        .bind(piece.material_cost_per_kg.amount().to_string())
        .bind(piece.mass_grams.to_string())
        .bind(piece.print_minutes.to_string())
        .bind(printer_id)
        .bind(piece.primer_cost_per_200ml.amount().to_string())
        .bind(piece.primer_consumed_ml.to_string())
        .bind(piece.sanding_paint_cost.amount().to_string())
        .bind(piece.post_processing_minutes.to_string())
        .bind(piece.post_processing_hourly_rate.amount().to_string())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, TimeZone};
    use morfika_core::PrinterConfig;
    use rust_decimal_macros::dec;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn piece(name: &str, grams: rust_decimal::Decimal) -> PrintPiece {
        PrintPiece {
            name: name.to_string(),
            mass_grams: grams,
            print_minutes: dec!(60),
            ..PrintPiece::draft()
        }
    }

    fn quotation(client: &str, pieces: Vec<PrintPiece>) -> Quotation {
        Quotation {
            pieces,
            ..Quotation::draft(client)
        }
    }

    #[tokio::test]
    async fn test_pieces_keep_their_order() {
        let repo = test_db().await.quotations();
        let q = quotation(
            "Ana",
            vec![piece("c", dec!(3)), piece("a", dec!(1)), piece("b", dec!(2))],
        );

        let id = repo.save(&q).await.unwrap();
        let loaded = repo.get_by_id(id).await.unwrap().unwrap();

        let names: Vec<&str> = loaded.pieces.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(loaded.pieces[1].mass_grams, dec!(1));
        assert_eq!(loaded.pieces[0].material, "PLA");
        assert_eq!(loaded.pieces[0].post_processing_hourly_rate.amount(), dec!(20000));
    }

    #[tokio::test]
    async fn test_update_replaces_items_and_keeps_created_at() {
        let repo = test_db().await.quotations();
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let id = repo
            .create_at(&quotation("Ana", vec![piece("a", dec!(10)), piece("b", dec!(20))]), created)
            .await
            .unwrap();

        let mut edited = repo.get_by_id(id).await.unwrap().unwrap();
        edited.client_name = "Ana María".to_string();
        edited.pieces = vec![piece("z", dec!(99))];
        edited.created_at = Utc::now();
        assert_eq!(repo.save(&edited).await.unwrap(), id);

        let loaded = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(loaded.client_name, "Ana María");
        assert_eq!(loaded.pieces.len(), 1);
        assert_eq!(loaded.pieces[0].name, "z");
        assert_eq!(loaded.created_at, created);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_of_missing_quotation_writes_nothing() {
        let repo = test_db().await.quotations();
        let ghost = Quotation {
            id: RecordId::Existing(Uuid::new_v4()),
            ..quotation("Ghost", vec![piece("a", dec!(1))])
        };

        assert!(matches!(repo.save(&ghost).await, Err(DbError::NotFound { .. })));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let repo = test_db().await.quotations();
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        for (offset, client) in [(0, "oldest"), (2, "newest"), (1, "middle")] {
            repo.create_at(&quotation(client, vec![piece("p", dec!(5))]), base + Duration::days(offset))
                .await
                .unwrap();
        }

        let clients: Vec<String> = repo.list().await.unwrap().into_iter().map(|q| q.client_name).collect();
        assert_eq!(clients, vec!["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn test_delete_removes_items() {
        let db = test_db().await;
        let repo = db.quotations();
        let id = repo.save(&quotation("Ana", vec![piece("a", dec!(1))])).await.unwrap();

        repo.delete(id).await.unwrap();
        assert!(repo.get_by_id(id).await.unwrap().is_none());

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotation_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);
        assert!(matches!(repo.delete(id).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_deleting_printer_unassigns_pieces() {
        let db = test_db().await;
        let printer_id = db
            .printers()
            .upsert(&PrinterConfig::new("Ender 3", dec!(400), Money::from_units(907), Money::from_units(25)))
            .await
            .unwrap();

        let mut p = piece("a", dec!(10));
        p.printer_id = Some(printer_id);
        let id = db.quotations().save(&quotation("Ana", vec![p])).await.unwrap();

        db.printers().delete(printer_id).await.unwrap();

        let loaded = db.quotations().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(loaded.pieces.len(), 1);
        assert!(loaded.pieces[0].printer_id.is_none());
    }

    #[tokio::test]
    async fn test_unknown_printer_is_stored_unassigned() {
        let repo = test_db().await.quotations();
        let mut p = piece("a", dec!(10));
        p.printer_id = Some(Uuid::new_v4());

        let id = repo.save(&quotation("Ana", vec![p])).await.unwrap();
        let loaded = repo.get_by_id(id).await.unwrap().unwrap();
        assert!(loaded.pieces[0].printer_id.is_none());
    }

    #[tokio::test]
    async fn test_negative_input_is_rejected() {
        let repo = test_db().await.quotations();
        let q = quotation("Ana", vec![piece("a", dec!(-1))]);

        assert!(matches!(repo.save(&q).await, Err(DbError::Validation(_))));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_decimal_surfaces_as_decode_error() {
        let db = test_db().await;
        let id = db.quotations().save(&quotation("Ana", vec![piece("a", dec!(1))])).await.unwrap();

        sqlx::query("UPDATE quotation_items SET mass_grams = 'lots'")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(matches!(
            db.quotations().get_by_id(id).await,
            Err(DbError::Decode { column: "quotation_items.mass_grams", .. })
        ));
    }
}
