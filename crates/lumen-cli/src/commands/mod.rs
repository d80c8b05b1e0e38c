pub mod compare;
pub mod config;
pub mod enhance;
pub mod histogram;
pub mod run;
