//! Configuration management

mod resolve;
mod settings;
mod store;

pub use resolve::{parse_font_size, resolve};
pub use settings::AppSettings;
pub use store::PropertyStore;
