// Utility modules

pub mod time_label;
