pub mod code;
pub mod sms;

pub use code::CodeCache;
pub use sms::SmsRepository;

#[cfg(test)]
pub use code::MockCodeCache;
#[cfg(test)]
pub use sms::MockSmsRepository;
