//! Per-invocation application context: configuration, database service, and
//! the resolved actor.

use anyhow::Context as _;

use dakhla_config::DakhlaConfig;
use dakhla_core::identity::{Actor, Origin};
use dakhla_db::service::DakhlaService;

use crate::cli::GlobalFlags;

pub struct AppContext {
    pub config: DakhlaConfig,
    pub service: DakhlaService,
    actor: Option<Actor>,
}

impl AppContext {
    /// Load configuration, open the database, and resolve the acting user.
    pub async fn bootstrap(flags: &GlobalFlags) -> anyhow::Result<Self> {
        let config = DakhlaConfig::load_with_dotenv().context("loading configuration")?;
        let db_path = flags.db.clone().unwrap_or_else(|| config.database.path.clone());

        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let service = DakhlaService::new_local(&db_path)
            .await
            .with_context(|| format!("opening database at {db_path}"))?;

        let actor = match &flags.actor {
            Some(user_id) => Some(
                service
                    .resolve_actor(user_id)
                    .await
                    .map_err(|e| anyhow::anyhow!("resolving actor {user_id}: {e}"))?,
            ),
            None => None,
        };

        Ok(Self {
            config,
            service,
            actor,
        })
    }

    /// The acting user, required by every record command.
    pub fn actor(&self) -> anyhow::Result<&Actor> {
        self.actor
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("this command requires --actor <user-id>"))
    }

    /// Request origin reported alongside audit entries. The CLI has no
    /// network peer; it reports the tool identity as the user agent.
    #[must_use]
    pub fn origin(&self) -> Origin {
        Origin {
            ip_address: None,
            user_agent: Some(concat!("dkl/", env!("CARGO_PKG_VERSION")).to_string()),
            location: None,
        }
    }
}
