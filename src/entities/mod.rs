pub mod prelude;

pub mod businesses;
