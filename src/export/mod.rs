pub mod raw_data;
pub mod plot;
