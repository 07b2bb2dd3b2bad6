pub mod observations;
pub mod vocabulary;
pub use observations::Observations;
pub use vocabulary::Vocabulary;
