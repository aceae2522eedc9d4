pub mod cache;
pub mod clock;
pub mod interface;
pub mod normalize;
pub mod punctuation;
pub mod spans;
pub mod translator;

pub use cache::TranslationCache;
pub use clock::SystemClock;
pub use interface::{TranslateError, TranslateRequest, TranslateResponse};
pub use translator::PhraseTranslator;
