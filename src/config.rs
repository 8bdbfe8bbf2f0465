use anyhow::{bail, Result};
use std::env;
use std::str::FromStr;

/// How owner-filtered reads (family members, a user's service requests) get
/// their newest-first ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OwnerQueryStrategy {
    /// Filter on the owner only and sort the results in memory. Needs no
    /// composite index; undated records sort last.
    #[default]
    QueryThenSort,
    /// Let the store order by date. Needs a composite index on
    /// (owner, date); the store omits undated records.
    CompositeIndex,
}

impl FromStr for OwnerQueryStrategy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "query-then-sort" | "query_then_sort" => Ok(OwnerQueryStrategy::QueryThenSort),
            "composite-index" | "composite_index" => Ok(OwnerQueryStrategy::CompositeIndex),
            other => bail!(
                "Invalid owner query strategy '{}'. Valid values are: query-then-sort, composite-index",
                other
            ),
        }
    }
}

/// Collection names, matching what the web application writes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collections {
    pub users: String,
    pub family_members: String,
    pub services: String,
    pub service_requests: String,
    pub notifications: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            users: "users".to_string(),
            family_members: "familyMembers".to_string(),
            services: "services".to_string(),
            service_requests: "serviceRequests".to_string(),
            notifications: "notifications".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub collections: Collections,
    pub owner_query_strategy: OwnerQueryStrategy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Collections::default();

        Ok(Config {
            collections: Collections {
                users: env::var("USERS_COLLECTION").unwrap_or(defaults.users),
                family_members: env::var("FAMILY_MEMBERS_COLLECTION")
                    .unwrap_or(defaults.family_members),
                services: env::var("SERVICES_COLLECTION").unwrap_or(defaults.services),
                service_requests: env::var("SERVICE_REQUESTS_COLLECTION")
                    .unwrap_or(defaults.service_requests),
                notifications: env::var("NOTIFICATIONS_COLLECTION")
                    .unwrap_or(defaults.notifications),
            },
            owner_query_strategy: match env::var("OWNER_QUERY_STRATEGY") {
                Ok(value) => value.parse()?,
                Err(_) => OwnerQueryStrategy::default(),
            },
        })
    }

    pub fn with_owner_query_strategy(mut self, strategy: OwnerQueryStrategy) -> Self {
        self.owner_query_strategy = strategy;
        self
    }
}
