pub mod error;
pub mod game_logs;
pub mod host;
pub mod install_manifest;
pub mod launch_planner;
pub mod launch_spec;
pub mod lifecycle_state;
pub mod metrics;
pub mod notifier;
pub mod orchestrator;
pub mod process;
pub mod provisioning;
pub mod shutdown_coordinator;
pub mod shutdown_result;

pub use error::{LifecycleError, Result, TimeoutStage};
pub use game_logs::{GameLogDirectory, LogFileInfo, LogTail};
pub use host::launcher::{DetachedLauncher, ProcessLauncher};
pub use host::resource_sampler::{
    DiskUsage, ProcessUsage, ResourceSampler, ResourceSnapshot, SystemUsage,
};
pub use host::signaller::{NixSignaller, ProcessSignaller, ShutdownSignal, SignalDelivery};
pub use install_manifest::InstallManifest;
pub use launch_planner::LaunchPlanner;
pub use launch_spec::LaunchSpec;
pub use lifecycle_state::{InFlight, LifecycleOperation, LifecycleState};
pub use metrics::LifecycleMetrics;
pub use notifier::{LifecycleEvent, LogNotifier, NotificationError, NotificationSink};
pub use orchestrator::host_services::HostServices;
pub use orchestrator::lifecycle_orchestrator::LifecycleOrchestrator;
pub use orchestrator::restart_report::RestartReport;
pub use orchestrator::server_status::{ProcessSummary, ServerStatus};
pub use orchestrator::update_report::UpdateReport;
pub use process::locator::ProcessLocator;
pub use process::match_rules::{MatchRules, SelfIdentity};
pub use process::process_entry::ProcessEntry;
pub use process::process_handle::ProcessHandle;
pub use process::process_role::ProcessRole;
pub use process::process_set::ProcessSet;
pub use process::process_table::{ProcessTable, SysinfoProcessTable};
pub use provisioning::output_tail::OutputTail;
pub use provisioning::provision_outcome::ProvisionOutcome;
pub use provisioning::provision_request::ProvisionRequest;
pub use provisioning::provisioner::Provisioner;
pub use provisioning::steamcmd::SteamCmdProvisioner;
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_result::{ProcessOutcome, ShutdownResult, TerminationOutcome};

#[cfg(test)]
mod tests;
