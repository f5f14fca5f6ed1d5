//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered user accounts.
    ///
    /// The password digest is stored as hex-encoded salt and SHA-256 output
    /// alongside the account row.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalised (lowercased, trimmed) email address, unique.
        email -> Varchar,
        /// Human-readable display name.
        display_name -> Varchar,
        /// Account role: `client`, `agent`, or `admin`.
        role -> Varchar,
        /// Account status: `active` or `suspended`.
        status -> Varchar,
        /// URL of the current avatar in the upload provider, if set.
        avatar_url -> Nullable<Varchar>,
        /// Hex-encoded random salt for the password digest.
        salt_hex -> Varchar,
        /// Hex-encoded SHA-256 digest of salt plus password.
        digest_hex -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Immigration cases submitted by clients.
    cases (id) {
        id -> Uuid,
        /// Human-facing reference (`VF-` prefix plus eight characters), unique.
        reference -> Varchar,
        /// Owning client.
        client_id -> Uuid,
        /// Currently assigned agent, if any.
        assigned_agent_id -> Nullable<Uuid>,
        service_type -> Varchar,
        title -> Varchar,
        details -> Text,
        /// Lifecycle status, e.g. `submitted`, `in_review`, `approved`.
        status -> Varchar,
        /// Triage priority: `low`, `normal`, `high`, or `urgent`.
        priority -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-case message threads between clients and staff.
    case_messages (id) {
        id -> Uuid,
        case_id -> Uuid,
        sender_id -> Uuid,
        body -> Text,
        sent_at -> Timestamptz,
        /// Set when a participant other than the sender reads the message.
        read_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Stored notifications backing the in-app inbox.
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        /// Notification category, e.g. `case_update`, `new_message`.
        kind -> Varchar,
        title -> Varchar,
        body -> Text,
        case_id -> Nullable<Uuid>,
        read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Registration invite codes with bounded redemption counts.
    invite_codes (id) {
        id -> Uuid,
        /// The redeemable code string, unique.
        code -> Varchar,
        /// Role granted on redemption.
        role -> Varchar,
        max_uses -> Int4,
        used_count -> Int4,
        expires_at -> Nullable<Timestamptz>,
        revoked -> Bool,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reusable document templates with `{{placeholder}}` substitution.
    document_templates (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        body -> Text,
        /// Placeholder names extracted from the body, in order of appearance.
        placeholders -> Array<Varchar>,
        created_by -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only versioned legal documents (terms, privacy policy).
    legal_documents (id) {
        id -> Uuid,
        slug -> Varchar,
        /// Monotonic version per slug, starting at 1.
        version -> Int4,
        title -> Varchar,
        body -> Text,
        published -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Payment records mirroring provider-side intents.
    payments (id) {
        id -> Uuid,
        case_id -> Uuid,
        client_id -> Uuid,
        amount_cents -> Int8,
        /// ISO 4217 currency code, uppercased.
        currency -> Varchar,
        /// Payment status: `pending`, `succeeded`, `failed`, or `refunded`.
        status -> Varchar,
        /// Opaque provider reference, unique.
        provider_ref -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail of staff and client actions.
    activity_log (id) {
        id -> Uuid,
        actor_id -> Uuid,
        /// Short action name, e.g. `case.assign`.
        action -> Varchar,
        case_id -> Nullable<Uuid>,
        /// Structured action context.
        details -> Jsonb,
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// History of case hand-offs between agents.
    transfer_history (id) {
        id -> Uuid,
        case_id -> Uuid,
        from_agent_id -> Uuid,
        to_agent_id -> Uuid,
        reason -> Text,
        transferred_by -> Uuid,
        transferred_at -> Timestamptz,
    }
}

diesel::table! {
    /// Seed runs already applied, keyed by seed name.
    seed_runs (seed_name) {
        seed_name -> Varchar,
        records_created -> Int8,
        applied_at -> Timestamptz,
    }
}

diesel::joinable!(case_messages -> cases (case_id));
diesel::joinable!(payments -> cases (case_id));
diesel::joinable!(transfer_history -> cases (case_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    cases,
    case_messages,
    notifications,
    invite_codes,
    document_templates,
    legal_documents,
    payments,
    activity_log,
    transfer_history,
    seed_runs,
);
