pub mod catalog;
pub mod character_test;
pub mod maintenance;
pub mod mastery;
pub mod test_results;
pub mod vocabulary_session;
