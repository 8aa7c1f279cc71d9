pub mod encode;
pub mod predict;
pub mod run;
