pub mod csv_sink;
pub mod fetcher;
pub mod notify;

pub use csv_sink::CsvSink;
pub use fetcher::ReqwestFetcher;
pub use notify::SmtpNotifier;
