use crate::{
    DetachedLauncher, LogNotifier, NixSignaller, NotificationSink, ProcessLauncher,
    ProcessSignaller, ProcessTable, Provisioner, SelfIdentity, SteamCmdProvisioner,
    SysinfoProcessTable,
};

use std::sync::Arc;

use gsm_config::ProvisioningConfig;

/// Host-facing collaborators of the orchestrator.
pub struct HostServices {
    pub table: Arc<dyn ProcessTable>,
    pub signaller: Arc<dyn ProcessSignaller>,
    pub launcher: Arc<dyn ProcessLauncher>,
    pub provisioner: Arc<dyn Provisioner>,
    pub notifier: Arc<dyn NotificationSink>,
    pub identity: SelfIdentity,
}

impl HostServices {
    /// Real process table, Unix signals, detached spawn and steamcmd.
    pub fn system(provisioning: &ProvisioningConfig) -> Self {
        Self {
            table: Arc::new(SysinfoProcessTable::new()),
            signaller: Arc::new(NixSignaller::new()),
            launcher: Arc::new(DetachedLauncher::new()),
            provisioner: Arc::new(SteamCmdProvisioner::from_config(provisioning)),
            notifier: Arc::new(LogNotifier),
            identity: SelfIdentity::current(),
        }
    }
}
