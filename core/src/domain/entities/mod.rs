//! Domain entities representing core business objects.

pub mod sms_message;
pub mod verification_code;


pub use sms_message::SmsMessage;
pub use verification_code::{
    generate_code, CodeKey, SetCodeOutcome, VerifyCodeOutcome, CODE_KEY_PREFIX, CODE_LENGTH,
    CODE_TTL_SECONDS, MAX_VERIFY_ATTEMPTS, RESEND_INTERVAL_SECONDS,
};
