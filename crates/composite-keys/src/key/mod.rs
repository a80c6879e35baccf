//! Keys - Key tuples, normalized keys and heterogeneous key input

pub mod input;
pub mod normalizer;
pub mod tuple;

pub use input::KeyInput;
pub use normalizer::{decode, encode, NORMALIZED_KEY_DELIMITER, NORMALIZED_KEY_NAME};
pub use tuple::KeyTuple;
