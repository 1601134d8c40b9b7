//! Data model shared by every pipeline stage.

pub mod cv;
pub mod fit;
pub mod float;
pub mod hyperparams;
pub mod record;
pub mod tensor;

pub use cv::CvRecord;
pub use fit::{
    BootstrapSummary, ComponentConfidence, CpModel, FitMetrics, FitResult, FitStatus, FitTarget,
};
pub use hyperparams::HyperParams;
pub use record::{TidyRecord, TidyTable};
pub use tensor::{Axis, LabeledTensor};

pub use rustc_hash::{FxHashMap, FxHashSet};
