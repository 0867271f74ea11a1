pub mod audit;
pub mod config;
pub mod cycles;
pub mod drafts;
pub mod entry;
pub mod export;
pub mod merge;
pub mod normalize;
pub mod paths;
pub mod publish;
pub mod query;
pub mod store;
pub mod util;
pub mod views;
pub mod visibility;
pub mod warn;
