//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    activity_log, case_messages, cases, document_templates, invite_codes, legal_documents,
    notifications, payments, seed_runs, transfer_history, users,
};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub status: String,
    pub avatar_url: Option<String>,
    pub salt_hex: String,
    pub digest_hex: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub status: &'a str,
    pub avatar_url: Option<&'a str>,
    pub salt_hex: &'a str,
    pub digest_hex: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Case models
// ---------------------------------------------------------------------------

/// Row struct for reading from the cases table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CaseRow {
    pub id: Uuid,
    pub reference: String,
    pub client_id: Uuid,
    pub assigned_agent_id: Option<Uuid>,
    pub service_type: String,
    pub title: String,
    pub details: String,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new case records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cases)]
pub(crate) struct NewCaseRow<'a> {
    pub id: Uuid,
    pub reference: &'a str,
    pub client_id: Uuid,
    pub assigned_agent_id: Option<Uuid>,
    pub service_type: &'a str,
    pub title: &'a str,
    pub details: &'a str,
    pub status: &'a str,
    pub priority: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for updating existing case records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cases)]
pub(crate) struct CaseUpdate<'a> {
    pub assigned_agent_id: Option<Option<Uuid>>,
    pub status: &'a str,
    pub priority: &'a str,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Message models
// ---------------------------------------------------------------------------

/// Row struct for reading from the case_messages table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = case_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CaseMessageRow {
    pub id: Uuid,
    pub case_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Insertable struct for creating new message records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = case_messages)]
pub(crate) struct NewCaseMessageRow<'a> {
    pub id: Uuid,
    pub case_id: Uuid,
    pub sender_id: Uuid,
    pub body: &'a str,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Notification models
// ---------------------------------------------------------------------------

/// Row struct for reading from the notifications table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub case_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new notification records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub case_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Invite models
// ---------------------------------------------------------------------------

/// Row struct for reading from the invite_codes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = invite_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InviteCodeRow {
    pub id: Uuid,
    pub code: String,
    pub role: String,
    pub max_uses: i32,
    pub used_count: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new invite records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invite_codes)]
pub(crate) struct NewInviteCodeRow<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub role: &'a str,
    pub max_uses: i32,
    pub used_count: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Template models
// ---------------------------------------------------------------------------

/// Row struct for reading from the document_templates table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = document_templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DocumentTemplateRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub body: String,
    pub placeholders: Vec<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new template records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = document_templates)]
pub(crate) struct NewDocumentTemplateRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub body: &'a str,
    pub placeholders: &'a [String],
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for updating existing template records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = document_templates)]
pub(crate) struct DocumentTemplateUpdate<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub body: &'a str,
    pub placeholders: &'a [String],
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Legal document models
// ---------------------------------------------------------------------------

/// Row struct for reading from the legal_documents table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = legal_documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LegalDocumentRow {
    pub id: Uuid,
    pub slug: String,
    pub version: i32,
    pub title: String,
    pub body: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for publishing new legal document versions.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = legal_documents)]
pub(crate) struct NewLegalDocumentRow<'a> {
    pub id: Uuid,
    pub slug: &'a str,
    pub version: i32,
    pub title: &'a str,
    pub body: &'a str,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Payment models
// ---------------------------------------------------------------------------

/// Row struct for reading from the payments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentRow {
    pub id: Uuid,
    pub case_id: Uuid,
    pub client_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub provider_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new payment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub(crate) struct NewPaymentRow<'a> {
    pub id: Uuid,
    pub case_id: Uuid,
    pub client_id: Uuid,
    pub amount_cents: i64,
    pub currency: &'a str,
    pub status: &'a str,
    pub provider_ref: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Audit trail models
// ---------------------------------------------------------------------------

/// Row struct for reading from the activity_log table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = activity_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ActivityRow {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub case_id: Option<Uuid>,
    pub details: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

/// Insertable struct for appending audit trail entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activity_log)]
pub(crate) struct NewActivityRow<'a> {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: &'a str,
    pub case_id: Option<Uuid>,
    pub details: &'a serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Transfer history models
// ---------------------------------------------------------------------------

/// Row struct for reading from the transfer_history table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = transfer_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransferRow {
    pub id: Uuid,
    pub case_id: Uuid,
    pub from_agent_id: Uuid,
    pub to_agent_id: Uuid,
    pub reason: String,
    pub transferred_by: Uuid,
    pub transferred_at: DateTime<Utc>,
}

/// Insertable struct for appending transfer records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transfer_history)]
pub(crate) struct NewTransferRow<'a> {
    pub id: Uuid,
    pub case_id: Uuid,
    pub from_agent_id: Uuid,
    pub to_agent_id: Uuid,
    pub reason: &'a str,
    pub transferred_by: Uuid,
    pub transferred_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Seed run models
// ---------------------------------------------------------------------------

/// Row struct for reading from the seed_runs table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = seed_runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SeedRunRow {
    pub seed_name: String,
    pub records_created: i64,
    pub applied_at: DateTime<Utc>,
}

/// Insertable struct for recording completed seed runs.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seed_runs)]
pub(crate) struct NewSeedRunRow<'a> {
    pub seed_name: &'a str,
    pub records_created: i64,
    pub applied_at: DateTime<Utc>,
}
