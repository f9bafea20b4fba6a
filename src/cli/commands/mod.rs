mod admin;
mod forge;
mod initdb;

pub use admin::{cmd_admin, read_password};
pub use forge::{DEMO_MOVIES, DEMO_USER_NAME, cmd_forge};
pub use initdb::cmd_initdb;
