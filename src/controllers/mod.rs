//! Demo controllers: the home/greeting pages and the sign-in flow.

pub mod index;
pub mod user;

pub use index::IndexController;
pub use user::UserController;

use crate::registry::HandlerRegistry;

/// Register every demo controller's routes.
pub fn register_all(registry: &mut HandlerRegistry) {
    index::register(registry);
    user::register(registry);
}
