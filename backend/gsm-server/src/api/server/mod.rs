pub mod restart_response;
pub mod server;
pub mod status_response;
pub mod update_info_response;
pub mod update_response;
