// Adapters layer: concrete flight providers and report sinks behind the
// domain ports.

pub mod amadeus;
pub mod kiwi;
pub mod telegram;

pub use amadeus::AmadeusProvider;
pub use kiwi::KiwiProvider;
pub use telegram::TelegramSink;
