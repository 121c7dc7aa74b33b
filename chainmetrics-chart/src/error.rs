use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("table has no column '{0}'")]
    MissingColumn(String),

    #[error("nothing to plot: table is empty")]
    EmptyTable,

    #[error("terminal: {0}")]
    Io(#[from] std::io::Error),
}
