pub mod format_reader;
