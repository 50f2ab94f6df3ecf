pub mod command;
pub mod fog;
pub mod freeze;
pub mod grid;
pub mod pursuit;
pub mod tile;
