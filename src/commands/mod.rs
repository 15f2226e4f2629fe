pub mod collect;
pub mod rank;
pub mod status;
