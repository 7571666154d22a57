pub mod characters;
pub mod vocabulary;
