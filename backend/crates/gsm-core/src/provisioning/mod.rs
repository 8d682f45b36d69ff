pub mod output_tail;
pub mod provision_outcome;
pub mod provision_request;
pub mod provisioner;
pub mod steamcmd;
