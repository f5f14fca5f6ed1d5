//! PostgreSQL-backed `PaymentRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::case::CaseId;
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::ports::{PaymentPersistenceError, PaymentRepository};
use crate::domain::user::UserId;

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewPaymentRow, PaymentRow};
use super::pool::{DbPool, PoolError};
use super::schema::payments;

/// Diesel-backed implementation of the `PaymentRepository` port.
#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PaymentPersistenceError {
    map_basic_pool_error(error, PaymentPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PaymentPersistenceError {
    map_basic_diesel_error(
        error,
        PaymentPersistenceError::query,
        PaymentPersistenceError::connection,
    )
}

fn row_to_payment(row: PaymentRow) -> Result<Payment, PaymentPersistenceError> {
    let status = PaymentStatus::parse(&row.status).ok_or_else(|| {
        PaymentPersistenceError::query(format!("unrecognised payment status: {}", row.status))
    })?;

    Ok(Payment {
        id: row.id,
        case_id: CaseId::from_uuid(row.case_id),
        client_id: UserId::from_uuid(row.client_id),
        amount_cents: row.amount_cents,
        currency: row.currency,
        status,
        provider_ref: row.provider_ref,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl PaymentRepository for DieselPaymentRepository {
    async fn insert(&self, payment: &Payment) -> Result<(), PaymentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewPaymentRow {
            id: payment.id,
            case_id: *payment.case_id.as_uuid(),
            client_id: *payment.client_id.as_uuid(),
            amount_cents: payment.amount_cents,
            currency: &payment.currency,
            status: payment.status.as_str(),
            provider_ref: &payment.provider_ref,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        };

        diesel::insert_into(payments::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_case(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<Payment>, PaymentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PaymentRow> = payments::table
            .filter(payments::case_id.eq(case_id.as_uuid()))
            .order(payments::created_at.desc())
            .select(PaymentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_payment).collect()
    }

    async fn find_by_provider_ref(
        &self,
        provider_ref: &str,
    ) -> Result<Option<Payment>, PaymentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = payments::table
            .filter(payments::provider_ref.eq(provider_ref))
            .select(PaymentRow::as_select())
            .first::<PaymentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_payment).transpose()
    }

    async fn update(&self, payment: &Payment) -> Result<(), PaymentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(payments::table.filter(payments::id.eq(payment.id)))
            .set((
                payments::status.eq(payment.status.as_str()),
                payments::updated_at.eq(payment.updated_at),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
