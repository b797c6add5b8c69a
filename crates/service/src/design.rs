//! Filter design dump for `ecg-processor --print-design`

use anyhow::{Context, Result};
use openecg_filters::FilterConfig;
use openecg_ipc::codec::ndarray::PackedArray;
use serde::Serialize;

/// Output encoding of the design dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DesignFormat {
    /// Pretty-printed JSON
    Json,
    /// MessagePack, hex encoded on one line
    MsgpackHex,
}

/// Coefficient tables of the active filter chain.
///
/// Each table is a `[sections, 6]` array of `b0 b1 b2 a0 a1 a2` rows.
#[derive(Debug, Serialize)]
pub struct DesignReport {
    /// Configuration the tables were designed from
    pub config: FilterConfig,
    /// Notch frequency after folding below Nyquist
    pub effective_notch_hz: f64,
    /// Bandpass cascade
    pub bandpass: PackedArray,
    /// Notch cascade
    pub notch: PackedArray,
}

impl DesignReport {
    /// Design the filters for `config`.
    pub fn new(config: FilterConfig) -> Result<Self> {
        let design = config.design().context("Filter design failed")?;
        Ok(Self {
            effective_notch_hz: config.effective_notch_hz(),
            bandpass: PackedArray::sos_table(&design.bandpass),
            notch: PackedArray::sos_table(&design.notch),
            config,
        })
    }

    /// Encode the report.
    pub fn render(&self, format: DesignFormat) -> Result<String> {
        match format {
            DesignFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to encode design as JSON")
            }
            DesignFormat::MsgpackHex => {
                let bytes = rmp_serde::to_vec_named(self)
                    .context("Failed to encode design as MessagePack")?;
                Ok(hex::encode(bytes))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_design_report() -> Result<()> {
        let report = DesignReport::new(FilterConfig::default())?;
        assert!((report.effective_notch_hz - 40.0).abs() < 1e-9);
        assert_eq!(report.notch.shape(), &[1, 6][..]);
        assert_eq!(report.bandpass.shape().get(1), Some(&6));

        let json: serde_json::Value = serde_json::from_str(&report.render(DesignFormat::Json)?)?;
        assert_eq!(json["bandpass"]["type"], "<f8");

        let hex = report.render(DesignFormat::MsgpackHex)?;
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        Ok(())
    }
}
