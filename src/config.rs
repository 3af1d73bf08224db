use crate::error::{Result, WireSeqError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wire_sequence_common::{ColorMetric, Tolerance};

/// 設定ファイルの場所を上書きする環境変数
pub const CONFIG_ENV: &str = "WIRE_SEQUENCE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionParams,
    pub comparison: ComparisonParams,
}

/// 抽出パラメータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionParams {
    /// 色の切れ目とみなすRGB距離
    pub boundary_threshold: f32,
    /// 各領域の左右で捨てる列数
    pub border_margin: u32,
    /// 束が写る行帯（画像高さに対する割合）
    pub band_top: f32,
    pub band_bottom: f32,
    /// 切れ目判定で比較する列の間隔
    pub edge_span: u32,
    /// これより細い領域は境界ノイズ
    pub min_region_width: u32,
    /// 一様な画像の最大チャンネルがこれ未満ならブランク（ワイヤー無し）
    pub background_value: u8,
    /// 撮影台の背景色。未設定なら画像の左右両端から推定する
    pub backdrop: Option<[u8; 3]>,
    /// ワイヤー1本あたりのノイズ許容数
    pub max_slivers_per_wire: f32,
    /// ノイズが多いときに低信頼度で返さずエラーにする
    pub reject_ambiguous: bool,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self {
            boundary_threshold: 40.0,
            border_margin: 2,
            band_top: 0.4,
            band_bottom: 0.6,
            edge_span: 2,
            min_region_width: 4,
            background_value: 40,
            backdrop: None,
            max_slivers_per_wire: 2.0,
            reject_ambiguous: false,
        }
    }
}

/// 照合パラメータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonParams {
    /// 一致とみなす最大色距離（境界を含む）
    pub color_tolerance: f32,
    pub metric: ColorMetric,
}

impl Default for ComparisonParams {
    fn default() -> Self {
        Self {
            color_tolerance: 30.0,
            metric: ColorMetric::Rgb,
        }
    }
}

impl ComparisonParams {
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.color_tolerance, self.metric)
    }
}

/// コマンドラインからの上書き
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub color_tolerance: Option<f32>,
    pub boundary_threshold: Option<f32>,
    pub border_margin: Option<u32>,
    pub metric: Option<ColorMetric>,
}

impl Config {
    /// 設定を読み込む
    ///
    /// 優先順: `WIRE_SEQUENCE_CONFIG` → `~/.config/wire-sequence/config.json` → 既定値
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }

        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WireSeqError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| WireSeqError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| WireSeqError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("wire-sequence").join("config.json"))
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        if let Some(tolerance) = overrides.color_tolerance {
            self.comparison.color_tolerance = tolerance;
        }
        if let Some(threshold) = overrides.boundary_threshold {
            self.extraction.boundary_threshold = threshold;
        }
        if let Some(margin) = overrides.border_margin {
            self.extraction.border_margin = margin;
        }
        if let Some(metric) = overrides.metric {
            self.comparison.metric = metric;
        }
        self.validate()
    }

    /// 指定ファイル（無ければ既定の場所）から読み込み、上書きを適用する
    pub fn resolve(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_overrides(overrides)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let e = &self.extraction;

        if !e.boundary_threshold.is_finite() || e.boundary_threshold <= 0.0 {
            return Err(WireSeqError::Config(format!(
                "boundary_threshold must be positive, got {}",
                e.boundary_threshold
            )));
        }
        if !(0.0..1.0).contains(&e.band_top) || !(e.band_top < e.band_bottom && e.band_bottom <= 1.0) {
            return Err(WireSeqError::Config(format!(
                "band must satisfy 0 <= band_top < band_bottom <= 1, got {}..{}",
                e.band_top, e.band_bottom
            )));
        }
        if e.edge_span == 0 {
            return Err(WireSeqError::Config("edge_span must be at least 1".into()));
        }
        if !e.max_slivers_per_wire.is_finite() || e.max_slivers_per_wire < 0.0 {
            return Err(WireSeqError::Config(format!(
                "max_slivers_per_wire must be >= 0, got {}",
                e.max_slivers_per_wire
            )));
        }

        let tolerance = self.comparison.color_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(WireSeqError::Config(format!(
                "color_tolerance must be >= 0, got {}",
                tolerance
            )));
        }

        Ok(())
    }
}
