//! Deterministic development seed data, applied at most once per seed name.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::domain::auth::PasswordDigest;
use crate::domain::case::{Case, CaseId, CasePriority, CaseReference, CaseStatus};
use crate::domain::notification::{Notification, NotificationKind};
use crate::domain::ports::{
    CaseRepository, NotificationRepository, SeedRun, SeedRunsRepository, UserRepository,
};
use crate::domain::user::{DisplayName, Email, Role, User, UserId};
use crate::domain::Error;

/// What the seeder should plant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSettings {
    /// Whether seeding runs at startup.
    pub enabled: bool,
    /// Name recorded against the run; changing it plants a fresh batch.
    pub seed_name: String,
    /// Number of agent accounts.
    pub agents: u32,
    /// Number of client accounts.
    pub clients: u32,
    /// Cases planted per client.
    pub cases_per_client: u32,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            seed_name: "dev".to_owned(),
            agents: 2,
            clients: 5,
            cases_per_client: 2,
        }
    }
}

/// Outcome of a seeding attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Seeding is disabled in configuration.
    Disabled,
    /// This seed name was applied before; nothing was planted.
    AlreadyApplied,
    /// A fresh batch was planted.
    Applied { records_created: u64 },
}

/// Plants deterministic development fixtures.
#[derive(Clone)]
pub struct SeedService {
    users: Arc<dyn UserRepository>,
    cases: Arc<dyn CaseRepository>,
    notifications: Arc<dyn NotificationRepository>,
    seed_runs: Arc<dyn SeedRunsRepository>,
}

const SERVICE_TYPES: &[&str] = &[
    "work_visa",
    "family_reunification",
    "permanent_residency",
    "citizenship",
];

fn rng_for(seed_name: &str) -> StdRng {
    let mut hasher = DefaultHasher::new();
    seed_name.hash(&mut hasher);
    StdRng::seed_from_u64(hasher.finish())
}

fn seeded_user(role: Role, index: u32, seed_name: &str) -> Result<User, Error> {
    let slug = role.as_str();
    let email = Email::new(format!("{slug}{index}@{seed_name}.visaflow.test"))
        .map_err(|error| Error::internal(format!("seed email rejected: {error}")))?;
    let display_name = DisplayName::new(format!("Seed {slug} {index}"))
        .map_err(|error| Error::internal(format!("seed name rejected: {error}")))?;
    Ok(User::new(UserId::random(), email, display_name, role))
}

impl SeedService {
    /// Assemble the service over its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        cases: Arc<dyn CaseRepository>,
        notifications: Arc<dyn NotificationRepository>,
        seed_runs: Arc<dyn SeedRunsRepository>,
    ) -> Self {
        Self {
            users,
            cases,
            notifications,
            seed_runs,
        }
    }

    /// Plant the configured fixtures unless this seed name already ran.
    ///
    /// All accounts share the password `seed-password`; case references come
    /// from an RNG keyed on the seed name, so a given name always plants the
    /// same batch.
    pub async fn run(&self, settings: &SeedSettings) -> Result<SeedOutcome, Error> {
        if !settings.enabled {
            return Ok(SeedOutcome::Disabled);
        }
        if self
            .seed_runs
            .find(&settings.seed_name)
            .await
            .map_err(|error| Error::service_unavailable(error.to_string()))?
            .is_some()
        {
            info!(seed = %settings.seed_name, "seed already applied, skipping");
            return Ok(SeedOutcome::AlreadyApplied);
        }

        let mut rng = rng_for(&settings.seed_name);
        let mut records: u64 = 0;

        let admin = seeded_user(Role::Admin, 1, &settings.seed_name)?;
        self.insert_user(&admin).await?;
        records += 1;

        let mut agents = Vec::with_capacity(settings.agents as usize);
        for index in 1..=settings.agents {
            let agent = seeded_user(Role::Agent, index, &settings.seed_name)?;
            self.insert_user(&agent).await?;
            records += 1;
            agents.push(agent);
        }

        for client_index in 1..=settings.clients {
            let client = seeded_user(Role::Client, client_index, &settings.seed_name)?;
            self.insert_user(&client).await?;
            records += 1;

            for case_index in 0..settings.cases_per_client {
                let service_type = SERVICE_TYPES
                    .get((client_index + case_index) as usize % SERVICE_TYPES.len())
                    .copied()
                    .unwrap_or("work_visa");
                let now = Utc::now();
                let case = Case {
                    id: CaseId::random(),
                    reference: CaseReference::generate(&mut rng),
                    client_id: client.id,
                    assigned_agent_id: None,
                    service_type: service_type.to_owned(),
                    title: format!("Seeded {service_type} application"),
                    details: format!(
                        "Fixture case {case_index} planted by the {} seed.",
                        settings.seed_name
                    ),
                    status: CaseStatus::Submitted,
                    priority: CasePriority::Normal,
                    created_at: now,
                    updated_at: now,
                };
                self.cases
                    .insert(&case)
                    .await
                    .map_err(|error| Error::internal(error.to_string()))?;
                records += 1;
            }

            let welcome = Notification::new(
                client.id,
                NotificationKind::System,
                "Welcome to Visaflow",
                "Your seeded account is ready. Sign in with the shared seed password.",
                None,
            );
            if let Err(error) = self.notifications.insert(&welcome).await {
                warn!(user_id = %client.id, %error, "failed to plant welcome notification");
            } else {
                records += 1;
            }
        }

        let run = SeedRun {
            seed_name: settings.seed_name.clone(),
            records_created: records,
            applied_at: Utc::now(),
        };
        self.seed_runs
            .record(&run)
            .await
            .map_err(|error| Error::internal(error.to_string()))?;
        info!(seed = %settings.seed_name, records, "seed applied");
        Ok(SeedOutcome::Applied {
            records_created: records,
        })
    }

    async fn insert_user(&self, user: &User) -> Result<(), Error> {
        let digest = PasswordDigest::create("seed-password");
        self.users
            .insert(user, digest.salt_hex(), digest.digest_hex())
            .await
            .map_err(|error| Error::internal(error.to_string()))
    }
}
