pub mod bootstrap;
pub mod exec;
pub mod status;
pub mod update;

pub use bootstrap::bootstrap_command;
pub use exec::exec_command;
pub use status::status_command;
pub use update::update_command;
