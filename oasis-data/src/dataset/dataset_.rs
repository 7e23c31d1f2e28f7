use super::*;
use crate::common::*;

/// The dataset backed by a pool of subject directories.
pub trait SubjectDataset
where
    Self: Debug + Send + Sync,
{
    /// The subject pool listed at construction.
    fn pool(&self) -> &SubjectPool;
}

/// The dataset that can be random accessed.
pub trait RandomAccessDataset
where
    Self: Send + Sync,
{
    type Record: Send + 'static;

    /// Get number of records in the dataset.
    fn num_records(&self) -> usize;

    /// Get the nth record in the dataset.
    fn nth(&self, index: usize) -> Result<Self::Record>;
}

/// The dataset that can be enumerated through a stream.
pub trait StreamingDataset {
    type Record;

    fn stream(&self) -> Result<Pin<Box<dyn Stream<Item = Result<Self::Record>> + Send>>>;
}
