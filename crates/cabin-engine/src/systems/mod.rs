pub mod cards;
pub mod phase;
pub mod prologue;
pub mod schedule;
pub mod timeline;
