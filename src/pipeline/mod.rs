pub mod cleanup;
pub mod demux;
pub mod dispatch;
pub mod executor;
pub mod options;

pub use cleanup::{remove_intermediates, CleanupReport, INTERMEDIATE_EXTENSIONS};
pub use demux::{Demuxer, UsmDemuxer};
pub use dispatch::{discover, dispatch, BatchReport, FileFailure};
pub use executor::{AudioRouting, FileReport, JoinOutcome, JoinSkipReason, Pipeline};
pub use options::PipelineOptions;
