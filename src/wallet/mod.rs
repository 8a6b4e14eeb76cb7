pub mod keypair;

pub use keypair::{load_keypair, parse_destination};
