pub mod accessor;
pub mod color;
pub mod component;
pub mod config;
pub mod domain;
pub mod format;
pub mod prepare;
pub mod scale;
pub mod sorting;
pub mod stack;
pub mod time;
pub mod types;
pub mod variables;

pub use accessor::{CategoryAccessor, MeasureAccessor, TemporalAccessor};
pub use color::{OrdinalColorScale, SequentialColorScale};
pub use component::{
    ComponentRef, Components, Dimension, DimensionKind, DimensionValue, Measure, ScaleType,
    TimeUnit,
};
pub use config::{
    AxisSide, CalculationType, ChartConfig, ChartType, ImputationType, SegmentLayout, Sorting,
    SortingOrder, SortingType,
};
pub use domain::{DualAxisDomains, MinValueRule, dual_axis_domains, measure_domain};
pub use prepare::{impute_observations, impute_series, prepare};
pub use scale::{BandScale, LinearScale, SqrtScale, TimeScale};
pub use sorting::{Category, MeasureBasis, sort_categories};
pub use stack::{SeriesPoint, StackEntry, StackedSeries, stack, stacked_domain};
pub use types::{ChartBounds, IRI_SUFFIX, Margins, Observation, ObservationValue, Point, Viewport};
pub use variables::{ChartVariables, bind_variables};
