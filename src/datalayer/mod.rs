pub mod db_ops;
pub mod types;
pub mod users;

pub use db_ops::{DatabaseHealth, DbConfig, DbManager, initialize_database};
pub use types::User;
pub use users::UserStore;
