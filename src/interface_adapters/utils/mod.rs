pub mod palette;
pub mod rng;
