pub mod analysis;
pub mod email;

pub use analysis::AnalysisService;
pub use email::EmailService;
