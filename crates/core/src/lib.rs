pub mod config;
pub mod converter;
pub mod discovery;
pub mod dispatcher;
pub mod encoding;
pub mod layout;
pub mod staging;
pub mod tags;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, BatchConfig, Config, ConfigError,
    ToolsConfig,
};
pub use converter::{
    ConversionJob, ConversionReport, Converter, ConverterError, LameConverter, Stage,
};
pub use discovery::{discover, Discovery, DiscoveryError, InputFile, ListSource};
pub use dispatcher::{
    plan_tasks, BatchSummary, Dispatcher, JobFailure, JobOutcome, Plan, Task, WorkerReport,
};
pub use encoding::{EncodingError, EncodingOptions, QualityFlags, QualityMode};
pub use layout::{common_root, LayoutError, OutputLayout};
pub use tags::{parse_vorbis_comments, Id3Tags, VorbisComments};
