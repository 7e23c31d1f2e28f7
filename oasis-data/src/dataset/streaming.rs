use super::*;
use crate::common::*;

/// Enumerates a random-access dataset in index order as a stream.
///
/// Records are decoded one at a time on the blocking thread pool of the
/// running tokio runtime.
#[derive(Debug)]
pub struct RandomAccessStream<D>
where
    D: 'static + RandomAccessDataset,
{
    dataset: Arc<D>,
}

impl<D> RandomAccessStream<D>
where
    D: 'static + RandomAccessDataset,
{
    pub fn new(dataset: D) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }
}

impl<D> StreamingDataset for RandomAccessStream<D>
where
    D: 'static + RandomAccessDataset,
{
    type Record = D::Record;

    fn stream(&self) -> Result<Pin<Box<dyn Stream<Item = Result<D::Record>> + Send>>> {
        let num_records = self.dataset.num_records();
        let dataset = self.dataset.clone();
        let stream = stream::iter(0..num_records).then(move |index| {
            let dataset = dataset.clone();
            async move {
                let record = tokio::task::spawn_blocking(move || dataset.nth(index))
                    .await
                    .map_err(|err| format_err!("record {} loading task failed: {}", index, err))??;
                Ok::<_, Error>(record)
            }
        });

        Ok(Box::pin(stream))
    }
}
