pub mod article;
pub mod scoring;
