pub mod file_read;
pub mod llm;
pub mod memory;
pub mod router;
pub mod transform;
pub mod web_search;
