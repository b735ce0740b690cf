pub mod engine;
pub mod filter;
pub mod preprocess;
pub mod setup;

pub use engine::{OCR_WHITELIST, TesseractRecognizer, TextRecognizer};
pub use filter::RecognitionFilter;
pub use preprocess::prepare_frame;
pub use setup::find_tesseract_executable;
