pub mod bus;
pub mod delay;
pub mod time;
