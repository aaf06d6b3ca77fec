pub mod users;

pub use users::{UserChanges, ValidUserInput};
