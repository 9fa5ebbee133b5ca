pub mod colors;
pub mod context;
pub mod control;
pub mod lap;
pub mod projection;
pub mod road;
pub mod track;
pub mod vehicle;
