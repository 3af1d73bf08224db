use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use wire_sequence::{batch, cli, config, decoder, extractor, logging, protocol};
use cli::{Cli, Commands};
use config::Config;
use protocol::{ExtractResponse, Op};
use wire_sequence::common::WireType;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // 単発コマンドは設定の失敗もエラーエンベロープで返す
    let config = Config::resolve(cli.config.as_deref(), &cli.overrides());

    match cli.command {
        Commands::Extract { images, wire_type, wire_counts, request } => {
            emit(config.and_then(|config| {
                if images.is_empty() {
                    let text = read_request(request.as_deref())?;
                    protocol::respond_text(Op::Extract, &text, &config)
                } else {
                    extract_files(&images, wire_type, wire_counts.as_deref(), &config)
                }
            }))?;
        }

        Commands::Compare { request } => {
            emit(config.and_then(|config| {
                let text = read_request(request.as_deref())?;
                protocol::respond_text(Op::Compare, &text, &config)
            }))?;
        }

        Commands::Serve => {
            let config = config?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            let handled = protocol::serve(stdin.lock(), stdout.lock(), &config)?;
            tracing::info!(handled, "serve loop finished");
        }

        Commands::Batch { input, output, quiet } => {
            let config = config?;
            let file = File::open(&input)
                .with_context(|| format!("入力ファイルを開けません: {}", input.display()))?;
            let reader = BufReader::new(file);

            let summary = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("出力ファイルを作成できません: {}", path.display()))?;
                    batch::run(reader, BufWriter::new(file), &config, !quiet)?
                }
                None => batch::run(reader, io::stdout().lock(), &config, !quiet)?,
            };

            eprintln!("✔ {}件処理（失敗 {}件）", summary.total, summary.failed);
        }

        Commands::Config { show, init } => {
            let config = config?;
            if init {
                let path = match &cli.config {
                    Some(path) => {
                        config.save_to(path)?;
                        path.clone()
                    }
                    None => config.save()?,
                };
                println!("✔ 設定ファイルを作成しました: {}", path.display());
            }

            if show || !init {
                let path = match &cli.config {
                    Some(path) => path.display().to_string(),
                    None => Config::config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| "(不明)".to_string()),
                };
                println!("設定: {}", path);
                println!("  境界閾値: {}", config.extraction.boundary_threshold);
                println!("  境界マージン: {}px", config.extraction.border_margin);
                println!(
                    "  行帯: {:.2}〜{:.2}",
                    config.extraction.band_top, config.extraction.band_bottom
                );
                println!("  色許容差: {} ({})", config.comparison.color_tolerance, config.comparison.metric);
                println!(
                    "  ノイズ時: {}",
                    if config.extraction.reject_ambiguous { "エラー" } else { "低信頼度で返す" }
                );
            }
        }
    }

    Ok(())
}

/// 応答を標準出力へ。失敗時はエラーエンベロープを出して非0終了
fn emit(result: wire_sequence::error::Result<String>) -> Result<()> {
    match result {
        Ok(line) => {
            println!("{}", line);
            Ok(())
        }
        Err(err) => {
            println!("{}", protocol::error_line(&err));
            Err(err.into())
        }
    }
}

fn read_request(path: Option<&Path>) -> wire_sequence::error::Result<String> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    Ok(text)
}

fn extract_files(
    paths: &[PathBuf],
    wire_type: WireType,
    wire_counts: Option<&[usize]>,
    config: &Config,
) -> wire_sequence::error::Result<String> {
    let images = paths
        .iter()
        .map(|p| decoder::load_file(p))
        .collect::<wire_sequence::error::Result<Vec<_>>>()?;
    let extraction = extractor::extract(&images, wire_type, wire_counts, &config.extraction)?;
    let response = ExtractResponse::from_extraction(&extraction)?;
    Ok(serde_json::to_string(&response)?)
}
