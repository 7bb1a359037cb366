pub mod chat;
pub mod config_cmd;
pub mod embed;
pub mod providers;
