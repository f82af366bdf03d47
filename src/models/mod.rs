// Module exports for models

pub mod day;
pub mod event;
pub mod group;
pub mod palette;
pub mod settings;
pub mod timeline;
pub mod trip;
