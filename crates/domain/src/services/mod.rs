//! Domain services.

mod csv_reader;

pub mod csv_processor;
pub mod dispatch;
pub mod ports;
pub mod template;
pub mod user_import;

pub use csv_processor::CsvProcessor;
pub use dispatch::EmailDispatchService;
pub use ports::{EmailSentStore, MailTransport, OutgoingEmail, UserDirectory, UserStore};
pub use template::{RenderedEmail, SurveyTemplate};
pub use user_import::{UserImportReport, UserImportService};
