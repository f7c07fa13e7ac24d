pub mod config;
pub mod console;
pub mod list;
pub mod manual;
pub mod menu;
pub mod output;
pub mod run;
