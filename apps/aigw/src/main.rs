use std::error::Error;
use std::path::Path;

use aigw_common::{Headers, STATUS, TranslatorConfig, TranslatorConfigPatch};
use aigw_protocol::openai::chat_completions::request::CreateChatCompletionRequestBody;
use aigw_translate::{ChatCompletionTranslator, GcpVertexAiChatCompletionTranslator};
use clap::Parser;
use tracing::info;

mod cli;

use crate::cli::{Cli, Command};

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("aigw failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(
        publisher = %config.publisher,
        model_name_override = %config.model_name_override.as_deref().unwrap_or(""),
        "config loaded"
    );
    let mut translator = GcpVertexAiChatCompletionTranslator::new(config);

    match cli.command {
        Command::Request { file } => {
            let raw = std::fs::read(&file)?;
            let request: CreateChatCompletionRequestBody = serde_json::from_slice(&raw)?;
            let mutation = translator.request_body(&raw, &request, false)?;
            print_headers(&mutation.headers);
            print_body(mutation.body.as_deref().unwrap_or_default());
        }
        Command::Response {
            request,
            file,
            chunk_size,
        } => {
            start_exchange(&mut translator, &request)?;
            if let Some(headers) = translator.response_headers(&Headers::new())? {
                print_headers(&headers);
            }
            let body = std::fs::read(&file)?;
            let slices = split_body(&body, chunk_size);
            let last = slices.len().saturating_sub(1);
            for (i, mut slice) in slices.into_iter().enumerate() {
                let mutation = translator.response_body(&Headers::new(), &mut slice, i == last)?;
                if let Some(headers) = &mutation.headers {
                    print_headers(headers);
                }
                print_body(mutation.body.as_deref().unwrap_or_default());
                if !mutation.usage.is_empty() {
                    info!(
                        model = %mutation.response_model,
                        input_tokens = mutation.usage.input_tokens,
                        output_tokens = mutation.usage.output_tokens,
                        total_tokens = mutation.usage.total_tokens,
                        cached_input_tokens = mutation.usage.cached_input_tokens,
                        "token usage"
                    );
                }
            }
        }
        Command::Error { file, status } => {
            let body = std::fs::read(&file)?;
            let headers = vec![(STATUS.to_string(), status)];
            let (headers, body) = translator.response_error(&headers, &mut body.as_slice())?;
            print_headers(&headers);
            print_body(&body);
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("aigw=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// CLI > ENV > defaults.
fn load_config(cli: &Cli) -> Result<TranslatorConfig, Box<dyn Error + Send + Sync>> {
    let mut patch = TranslatorConfigPatch::defaults();
    patch.overlay(TranslatorConfigPatch::from_env());
    patch.overlay(cli.config_patch());
    Ok(patch.into_config()?)
}

fn start_exchange(
    translator: &mut GcpVertexAiChatCompletionTranslator,
    path: &Path,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let raw = std::fs::read(path)?;
    let request: CreateChatCompletionRequestBody = serde_json::from_slice(&raw)?;
    translator.request_body(&raw, &request, false)?;
    Ok(())
}

/// A zero chunk size delivers the whole body at once.
fn split_body(body: &[u8], chunk_size: usize) -> Vec<&[u8]> {
    if chunk_size == 0 || body.is_empty() {
        return vec![body];
    }
    body.chunks(chunk_size).collect()
}

fn print_headers(headers: &Headers) {
    for (name, value) in headers {
        println!("{name}: {value}");
    }
}

fn print_body(body: &[u8]) {
    if body.is_empty() {
        return;
    }
    println!("{}", String::from_utf8_lossy(body));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_body_slices() {
        assert_eq!(split_body(b"abcde", 2), vec![&b"ab"[..], &b"cd"[..], &b"e"[..]]);
        assert_eq!(split_body(b"abc", 0), vec![&b"abc"[..]]);
        assert_eq!(split_body(b"", 4).len(), 1);
    }

    #[test]
    fn cli_flags_win_over_defaults() {
        let cli = Cli::parse_from([
            "aigw",
            "--publisher",
            "acme",
            "error",
            "body.json",
            "--status",
            "404",
        ]);
        let mut patch = TranslatorConfigPatch::defaults();
        patch.overlay(cli.config_patch());
        let config = patch.into_config().unwrap();
        assert_eq!(config.publisher, "acme");
        assert!(matches!(cli.command, Command::Error { ref status, .. } if status == "404"));
    }
}
