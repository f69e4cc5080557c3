pub mod gate;
pub mod sequence;
