pub use super::businesses::Entity as Businesses;
