/// Streaming CSV reader and writer over files or any `Read`/`Write`.
pub mod csv_file;
