pub mod args;
pub mod op;
pub mod ops;
pub mod storage;

pub use ops::{Broker, Cat, Grant, Health, Init, Restore, Upload, Version, Versions};
