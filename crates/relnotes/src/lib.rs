// Public modules
pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod dates;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod profiles;
pub mod render;
pub mod window;

// Re-export commonly used types
pub use aggregate::{aggregate, DateRange, Summary};
pub use classifier::{Rule, RuleSet};
pub use config::{parse_page_url, Config};
pub use dates::parse_date;
pub use error::{ConfigError, TransportError};
pub use extractor::{EntryExtractor, SiteProfile};
pub use fetcher::PageFetcher;
pub use io::{read_markup, write_output};
pub use models::{Category, ClassifiedEntry, RawEntry};
pub use pipeline::{classify_entries, Pipeline, PipelineOutput, RunStats};
pub use profiles::{GenericProfile, GoogleCloudProfile, ProfileChoice};
pub use render::{OutputFormat, Renderer, Report};
pub use window::TimeWindow;
