pub mod bouquet_writer;
pub mod ingester;
pub mod parser;
pub mod pipeline;
pub mod update_guard;
