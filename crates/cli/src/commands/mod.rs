pub mod config_cmd;
pub mod doctor;
pub mod init_db;
pub mod serve;
