pub mod actions;
pub mod comment;
pub mod create;
pub mod delete;
pub mod export;
pub mod init;
pub mod list;
pub mod show;
pub mod sla;
pub mod transition;
pub mod update;
