//! Local engine session backed by a JSON snapshot
//!
//! Each invocation loads the snapshot, runs one operation and writes the
//! snapshot back. Rejected operations leave the file untouched.

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use multisig_runtime::{
    EngineState, Environment, GovernanceEngine, Grant, InMemoryMetadataStore,
    InMemoryPermissions, InstallationParams, PermissionManager, PluginSetup, RecordingExecutor,
    SystemClock,
};
use multisig_types::Capability;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// What gets written to disk
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: EngineState,
    pub grants: Vec<Grant>,
}

impl Snapshot {
    pub fn read(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::NotInitialized(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write through a sibling temp file so a crash never truncates state
    pub fn write(&self, path: &Path) -> CliResult<()> {
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

pub struct Session {
    path: PathBuf,
    engine: GovernanceEngine,
    permissions: Arc<InMemoryPermissions>,
    executor: Arc<RecordingExecutor>,
}

impl Session {
    /// Install a fresh engine from configuration
    pub fn install(config: &CliConfig, force: bool) -> CliResult<Self> {
        let path = PathBuf::from(&config.state_path);
        if path.exists() && !force {
            return Err(CliError::AlreadyInitialized(config.state_path.clone()));
        }

        let engine_config = &config.engine;
        let mut params = InstallationParams::new(
            engine_config.dao.clone(),
            engine_config.plugin.clone(),
            engine_config.members.clone(),
        )
        .with_settings(engine_config.settings);
        params.intervention_policy = engine_config.intervention_policy;
        if let Some(parent) = &config.parent {
            params = params.with_parent(parent.clone());
        }
        let prepared = PluginSetup::prepare_installation(params)?;

        let permissions = Arc::new(InMemoryPermissions::new());
        permissions.apply(&prepared.permissions)?;
        // The dao starts out holding ROOT over itself
        permissions.grant(&engine_config.dao, &engine_config.dao, Capability::Root);

        let executor = Arc::new(RecordingExecutor::new());
        let engine = GovernanceEngine::initialize(
            prepared.config,
            environment(permissions.clone(), executor.clone()),
        )?;

        info!(path = %path.display(), "Engine installed");
        Ok(Self {
            path,
            engine,
            permissions,
            executor,
        })
    }

    pub fn open(path: impl Into<PathBuf>) -> CliResult<Self> {
        let path = path.into();
        let snapshot = Snapshot::read(&path)?;
        let permissions = Arc::new(InMemoryPermissions::from_grants(snapshot.grants));
        let executor = Arc::new(RecordingExecutor::new());
        let engine = GovernanceEngine::from_state(
            snapshot.state,
            environment(permissions.clone(), executor.clone()),
        );
        debug!(path = %path.display(), "Engine loaded");
        Ok(Self {
            path,
            engine,
            permissions,
            executor,
        })
    }

    pub fn engine(&self) -> &GovernanceEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GovernanceEngine {
        &mut self.engine
    }

    pub fn grants(&self) -> Vec<Grant> {
        self.permissions.grants()
    }

    /// Host actions dispatched during this session
    pub fn dispatched(&self) -> usize {
        self.executor.dispatched_actions().len()
    }

    pub fn save(self) -> CliResult<()> {
        let snapshot = Snapshot {
            grants: self.permissions.grants(),
            state: self.engine.into_state(),
        };
        snapshot.write(&self.path)?;
        debug!(path = %self.path.display(), "Engine saved");
        Ok(())
    }
}

fn environment(
    permissions: Arc<InMemoryPermissions>,
    executor: Arc<RecordingExecutor>,
) -> Environment {
    Environment::new(
        Arc::new(SystemClock),
        permissions,
        executor,
        Arc::new(InMemoryMetadataStore::new()),
    )
}
