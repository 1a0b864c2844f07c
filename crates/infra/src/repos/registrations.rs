use async_trait::async_trait;

use crate::db::Db;
use crate::models::{
    NewRegistration, PaymentUpdate, RegistrationPatch, RegistrationRow, RegistrationStats,
    TrackingId,
};
use crate::pagination::LimitOffset;
use crate::store::{RegistrationStore, StoreError};

#[derive(Clone)]
pub struct RegistrationRepo {
    pool: Db,
}

impl RegistrationRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    id, team_number, company_name, address, gst_number,
    contact_phone, contact_email,
    player1_name, player1_mobile, player1_email,
    player2_name, player2_mobile, player2_email,
    player3_name, player3_mobile, player3_email,
    captain_name, captain_designation, captain_phone, captain_email,
    payment_status, payment_method, payment_reference, payment_date,
    committee_member, referred_by, amount, created_at
"#;

#[async_trait]
impl RegistrationStore for RegistrationRepo {
    async fn find_by_tracking_id(
        &self,
        id: &TrackingId,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        let rows = sqlx::query_as::<_, RegistrationRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM registrations WHERE id = $1 ORDER BY team_number ASC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_event(&self, rows: &[NewRegistration]) -> Result<(), StoreError> {
        // One transaction for the whole event: a conflict or failure on any
        // team row rolls back the rows already written.
        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO registrations (
                    id, team_number, company_name, address, gst_number,
                    contact_phone, contact_email,
                    player1_name, player1_mobile, player1_email,
                    player2_name, player2_mobile, player2_email,
                    player3_name, player3_mobile, player3_email,
                    captain_name, captain_designation, captain_phone, captain_email,
                    payment_status, amount
                ) VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                    $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22
                )
                "#,
            )
            .bind(&row.id)
            .bind(&row.team_number)
            .bind(&row.company_name)
            .bind(&row.address)
            .bind(&row.gst_number)
            .bind(&row.contact_phone)
            .bind(&row.contact_email)
            .bind(&row.player1_name)
            .bind(&row.player1_mobile)
            .bind(&row.player1_email)
            .bind(&row.player2_name)
            .bind(&row.player2_mobile)
            .bind(&row.player2_email)
            .bind(&row.player3_name)
            .bind(&row.player3_mobile)
            .bind(&row.player3_email)
            .bind(&row.captain_name)
            .bind(&row.captain_designation)
            .bind(&row.captain_phone)
            .bind(&row.captain_email)
            .bind(crate::models::PaymentStatus::Pending)
            .bind(row.amount)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn record_payment(
        &self,
        id: &TrackingId,
        update: &PaymentUpdate,
    ) -> Result<u64, StoreError> {
        // `payment_method IS NULL` makes the terminal transition land at
        // most once, even under concurrent confirmations.
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET payment_status = $2,
                payment_method = $3,
                payment_date = $4,
                committee_member = $5,
                referred_by = $6
            WHERE id = $1 AND payment_method IS NULL
            "#,
        )
        .bind(id)
        .bind(update.status)
        .bind(update.method)
        .bind(update.payment_date)
        .bind(&update.committee_member)
        .bind(&update.referred_by)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn apply_patch(
        &self,
        id: &TrackingId,
        patch: &RegistrationPatch,
    ) -> Result<u64, StoreError> {
        // COALESCE keeps a single prepared statement for partial edits.
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET company_name = COALESCE($2, company_name),
                payment_status = COALESCE($3, payment_status),
                payment_reference = COALESCE($4, payment_reference),
                payment_date = COALESCE($5, payment_date)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&patch.company_name)
        .bind(patch.payment_status)
        .bind(&patch.payment_reference)
        .bind(patch.payment_date)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_event(&self, id: &TrackingId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM registrations")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_all(
        &self,
        page: Option<LimitOffset>,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        let p = page.unwrap_or_default();
        let rows = sqlx::query_as::<_, RegistrationRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM registrations
            ORDER BY created_at DESC, id, team_number
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(p.limit)
        .bind(p.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn stats(&self) -> Result<RegistrationStats, StoreError> {
        let (total, paid, pending): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE payment_status = 'Paid'),
                   COUNT(*) FILTER (WHERE payment_status = 'Pending')
            FROM registrations
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(RegistrationStats {
            total,
            paid,
            pending,
        })
    }
}
