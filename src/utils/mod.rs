mod string;

pub use string::*;
