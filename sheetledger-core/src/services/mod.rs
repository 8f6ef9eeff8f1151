//! Service layer - import orchestration
//!
//! The pipeline stages live in their own modules and are composed by
//! `import::ImportPipeline`. Delivery and event logging sit beside it.

pub mod delivery;
pub mod header;
pub mod import;
pub mod logging;
pub mod normalize;
pub mod resolver;
pub mod validate;

pub use delivery::{deliver_in_batches, BatchProgress, DeliverySummary, DEFAULT_BATCH_SIZE};
pub use header::locate_header;
pub use import::{ImportPipeline, ImportReport, ImportService, SheetLayout};
pub use logging::{EntryPoint, LogEntry, LogEvent, LogStats, LoggingService};
pub use normalize::{normalize_total, serial_to_date, DateNormalizer, TotalError};
pub use resolver::{
    ContentShape, DirectLabel, FieldResolver, Positional, Resolution, ResolveContext,
    ResolveStrategy, ReversedKeyValue,
};
pub use validate::{assemble, validate_row, ResolvedFields};
