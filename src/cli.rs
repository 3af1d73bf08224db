use crate::config::ConfigOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wire_sequence_common::{ColorMetric, WireType};

#[derive(Parser)]
#[command(name = "wire-sequence")]
#[command(about = "ワイヤーハーネスの色順序抽出・照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力（標準エラー）
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（省略時: ~/.config/wire-sequence/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 一致とみなす最大色距離
    #[arg(long, global = true)]
    pub tolerance: Option<f32>,

    /// 色の切れ目とみなす距離
    #[arg(long, global = true)]
    pub boundary_threshold: Option<f32>,

    /// 各ワイヤー領域の左右で捨てる列数
    #[arg(long, global = true)]
    pub border_margin: Option<u32>,

    /// 色距離 (rgb/cie76)
    #[arg(long, global = true)]
    pub metric: Option<ColorMetric>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            color_tolerance: self.tolerance,
            boundary_threshold: self.boundary_threshold,
            border_margin: self.border_margin,
            metric: self.metric,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像から色順序を抽出してJSONを出力
    Extract {
        /// 画像ファイル（front, back の順）。省略時は標準入力のJSONリクエスト
        images: Vec<PathBuf>,

        /// ワイヤー種別 (single/double)。画像ファイル指定時に使用
        #[arg(short = 't', long, default_value = "single")]
        wire_type: WireType,

        /// 端面ごとの期待本数（診断用）
        #[arg(short = 'n', long, value_delimiter = ',')]
        wire_counts: Option<Vec<usize>>,

        /// リクエストJSONファイル（省略時は標準入力）
        #[arg(short, long, conflicts_with = "images")]
        request: Option<PathBuf>,
    },

    /// 基準シーケンスと照合してJSONを出力
    Compare {
        /// リクエストJSONファイル（省略時は標準入力）
        #[arg(short, long)]
        request: Option<PathBuf>,
    },

    /// 1行1リクエストで標準入出力を処理し続ける
    Serve,

    /// JSON Lines ファイルを並列に一括処理
    Batch {
        /// 入力ファイル（1行1リクエスト）
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 進捗バーを表示しない
        #[arg(long)]
        quiet: bool,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 既定値で設定ファイルを作成
        #[arg(long)]
        init: bool,
    },
}
