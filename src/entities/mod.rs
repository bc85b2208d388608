pub mod property;

pub use property::Entity as Property;
