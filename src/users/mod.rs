pub mod guard;
pub mod memory;
pub mod model;
pub mod service;
pub mod store;

pub use memory::MemoryUserStore;
pub use model::{NewUser, UpdateUser, User};
pub use service::UserService;
pub use store::{PgUserStore, UserStore};
