// Rubric pipeline: catalog, request validation, prompt, table parsing, CSV export.
// All completion calls go through llm_client.

pub mod catalog;
pub mod export;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod request;
pub mod table_parser;
