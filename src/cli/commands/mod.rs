mod init;
mod seed;
mod user;

pub use init::cmd_init;
pub use seed::cmd_seed;
pub use user::cmd_create_user;
