pub mod locator;
pub mod match_rules;
pub mod process_entry;
pub mod process_handle;
pub mod process_role;
pub mod process_set;
pub mod process_table;
