pub mod host_services;
pub mod lifecycle_orchestrator;
pub mod restart_report;
pub mod server_status;
pub mod update_report;
