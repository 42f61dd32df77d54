pub mod chunk_executor;
