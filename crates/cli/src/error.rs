//! CLI Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("failed to load configuration")]
    Config,
    #[display("failed to open storage")]
    Storage,
    #[display("cache operation failed")]
    Cache,
    #[display("failed to read documents to import")]
    Import,
    #[display("failed to write output")]
    Output,
}
