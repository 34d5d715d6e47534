pub mod query;
pub mod ranked_result;
pub mod record;

pub use query::{GeoPoint, QueryPayload, SearchQuery};
pub use ranked_result::RankedResult;
pub use record::{AttributeValue, Attributes, Record};
