pub mod catalog;
pub mod loading;
pub mod quiz;
pub mod result;
