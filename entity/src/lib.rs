pub mod activity;
pub mod customer;
pub mod petsitter;
pub mod request;
pub mod user;

pub mod prelude {
    pub use super::activity::Entity as Activity;
    pub use super::customer::Entity as Customer;
    pub use super::petsitter::Entity as Petsitter;
    pub use super::request::Entity as Request;
    pub use super::user::Entity as User;
}
