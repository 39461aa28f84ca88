pub mod sqlite_sink;
pub mod text_file_sink;
