use std::path::PathBuf;

use aigw_common::TranslatorConfigPatch;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aigw", about = "Translate OpenAI chat completions for GCP Vertex AI")]
pub(crate) struct Cli {
    /// Vertex AI publisher segment of the model path.
    #[arg(long, global = true)]
    pub(crate) publisher: Option<String>,
    /// Send this model upstream instead of the one in the request.
    #[arg(long, global = true)]
    pub(crate) model_name_override: Option<String>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Translate an OpenAI chat request body.
    Request { file: PathBuf },
    /// Translate an upstream response body for the given request.
    Response {
        /// The OpenAI request the response answers.
        #[arg(long)]
        request: PathBuf,
        file: PathBuf,
        /// Feed a streamed body in slices of this many bytes.
        #[arg(long, default_value_t = 0)]
        chunk_size: usize,
    },
    /// Translate an upstream error body.
    Error {
        file: PathBuf,
        #[arg(long, default_value = "500")]
        status: String,
    },
}

impl Cli {
    pub(crate) fn config_patch(&self) -> TranslatorConfigPatch {
        TranslatorConfigPatch {
            publisher: self.publisher.clone(),
            model_name_override: self.model_name_override.clone(),
        }
    }
}
