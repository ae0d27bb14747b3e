pub mod cancel;
pub mod matcher;
pub mod search;
pub mod summary;

pub use cancel::CancellationFlag;
pub use matcher::TemporalMatcher;
pub use search::{CandidateSearch, LinearScan, SortedIndex};
pub use summary::{MatchOutcome, MatchSummary};
