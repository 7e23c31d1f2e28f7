use anyhow::{Context, Result};
use futures::stream::{StreamExt as _, TryStreamExt as _};
use log::info;
use oasis_data::{
    config::{DatasetConfig, PairDataset},
    dataset::{RandomAccessStream, StreamingDataset, SubjectDataset},
};
use prettytable::{cell, row, Table};
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use tch::Tensor;

#[derive(Debug, Clone, StructOpt)]
/// Inspect paired MRI volume datasets.
enum Args {
    /// List the subjects of a dataset.
    List {
        /// configuration file
        config_file: PathBuf,
    },
    /// Load records in index order and print their shapes.
    Inspect {
        /// configuration file
        config_file: PathBuf,
        #[structopt(long)]
        /// stop after this many records
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    match Args::from_args() {
        Args::List { config_file } => list(config_file)?,
        Args::Inspect { config_file, limit } => inspect(config_file, limit).await?,
    }

    Ok(())
}

fn load_dataset(config_file: &Path) -> Result<PairDataset> {
    let config = DatasetConfig::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;
    config.build()
}

fn list(config_file: impl AsRef<Path>) -> Result<()> {
    let dataset = load_dataset(config_file.as_ref())?;
    let pool = match &dataset {
        PairDataset::Paired(dataset) => dataset.pool(),
        PairDataset::PairedWithSeg(dataset) => dataset.pool(),
    };

    let mut table = Table::new();
    table.add_row(row!["index", "subject", "path", "exposed"]);
    pool.subjects()
        .iter()
        .enumerate()
        .for_each(|(index, subject)| {
            let exposed = if index < pool.len() { "yes" } else { "no" };
            table.add_row(row![index, subject.id, subject.path.display(), exposed]);
        });
    table.printstd();

    println!("{} subjects, {} records", pool.num_subjects(), pool.len());

    Ok(())
}

async fn inspect(config_file: impl AsRef<Path>, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(usize::MAX);
    let mut table = Table::new();

    match load_dataset(config_file.as_ref())? {
        PairDataset::Paired(dataset) => {
            table.add_row(row!["index", "source", "target", "source shape", "target shape"]);
            let stream = RandomAccessStream::new(dataset);
            let mut records = stream.stream()?.take(limit);
            let mut index = 0;

            while let Some(record) = records.try_next().await? {
                table.add_row(row![
                    index,
                    record.source_id,
                    record.target_id,
                    describe(&record.source),
                    describe(&record.target)
                ]);
                index += 1;
            }
        }
        PairDataset::PairedWithSeg(dataset) => {
            info!("label maps are read from '{}'", dataset.seg_dir().display());
            table.add_row(row![
                "index",
                "source shape",
                "target shape",
                "source seg shape",
                "target seg shape"
            ]);
            let stream = RandomAccessStream::new(dataset);
            let mut records = stream.stream()?.take(limit);
            let mut index = 0;

            while let Some(record) = records.try_next().await? {
                table.add_row(row![
                    index,
                    describe(&record.source),
                    describe(&record.target),
                    describe(&record.source_seg),
                    describe(&record.target_seg)
                ]);
                index += 1;
            }
        }
    }

    table.printstd();
    Ok(())
}

fn describe(tensor: &Tensor) -> String {
    format!("{:?} {:?}", tensor.size(), tensor.kind())
}
