pub mod candle;
pub mod config;
pub mod constant;
pub mod chan;
pub mod engine;
pub mod events;
pub mod fractal;
pub mod logging;
pub mod pivot;
pub mod replay;
pub mod segment;
pub mod snapshot;
pub mod stroke;
pub mod utils;

pub use candle::{MergedCandle, OrdinaryCandle};
pub use config::ChanConfig;
pub use constant::{Action, ChanError, Const, EventType, FractalPattern, Trend};
pub use chan::{ChanCore, StepReport};
pub use engine::{ChanEngine, StructureSnapshot};
pub use events::{EventPayload, Observable, Subscriber};
pub use fractal::{Fractal, PotentialFractal};
pub use logging::init_logging;
pub use pivot::{IsolationLine, Pivot};
pub use replay::{CandleFeed, CandleInput, load_candle_inputs};
pub use segment::{PriceBand, Segment};
pub use snapshot::{state_json, write_parquet_snapshot};
pub use stroke::Stroke;
