pub mod adb;
pub mod interface;
pub mod scripted;
