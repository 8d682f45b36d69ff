pub mod log_content_response;
pub mod log_list_response;
pub mod log_query;
pub mod logs;
