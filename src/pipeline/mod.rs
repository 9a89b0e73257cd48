pub mod generate;
pub mod midi_file;
pub mod otomata_url;
pub mod persistence;
pub mod settings;

pub use settings::BoardSettings;
