pub mod operator_guard;
