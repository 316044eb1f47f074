pub mod place;

pub use place::{CandidatePlace, Coordinates};
