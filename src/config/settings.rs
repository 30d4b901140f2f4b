use crate::config::types::Config;
use crate::config::validation::validate_http_url;
use crate::url::canonicalize;
use crate::vendors::{profile, VendorKey};
use crate::ConfigError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Values taken from the command line; `None`/`false` means "not given"
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub seed: Option<String>,
    pub out: Option<PathBuf>,
    pub spreadsheet: Option<PathBuf>,
    pub single: bool,
    pub strip_sku: bool,
    pub skip_catalog: bool,
    pub stop_after: Option<Duration>,
    pub cancel_after: Option<Duration>,
    pub stop_at: Option<String>,
    pub cancel_at: Option<String>,
    pub memstats: Option<Duration>,
}

/// Ways a crawl can be ended before the frontier drains
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopConditions {
    /// Finish in-flight fetches then stop, after this long
    pub stop_after: Option<Duration>,
    /// Abort everything after this long
    pub cancel_after: Option<Duration>,
    /// Canonical URL that triggers a stop when it comes up for fetching
    pub stop_at: Option<String>,
    /// Canonical URL that triggers a cancel when it comes up for fetching
    pub cancel_at: Option<String>,
}

impl StopConditions {
    /// Returns true if no stop or cancel trigger is configured
    pub fn is_empty(&self) -> bool {
        self.stop_after.is_none()
            && self.cancel_after.is_none()
            && self.stop_at.is_none()
            && self.cancel_at.is_none()
    }
}

/// Fully resolved settings for one run
///
/// Precedence is command line, then the `[vendor.<key>]` table of the run
/// file, then the built-in vendor profile. Immutable once built.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub vendor: VendorKey,
    pub seed: Url,
    pub presets: Vec<Url>,
    pub output_path: PathBuf,
    /// `None` when the run is made without a reference catalog
    pub catalog_path: Option<PathBuf>,
    pub strip_query: bool,
    pub single_only: bool,
    pub stop: StopConditions,
    pub memstats: Option<Duration>,
}

impl RunSettings {
    /// Resolves the settings for `vendor` from the run file and command line
    ///
    /// # Returns
    ///
    /// * `Ok(RunSettings)` - The settings for this run
    /// * `Err(ConfigError)` - A seed, preset or stop URL is not a valid http(s) URL
    pub fn resolve(
        vendor: VendorKey,
        config: &Config,
        cli: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let builtin = profile(vendor);
        let table = config.vendors.get(vendor.as_str());

        let seed_str = cli
            .seed
            .clone()
            .or_else(|| table.and_then(|t| t.seed.clone()))
            .unwrap_or_else(|| builtin.seed.to_string());
        let seed = validate_http_url(&seed_str)?;

        // A single-page run only fetches the seed
        let presets = if cli.single {
            Vec::new()
        } else {
            match table.and_then(|t| t.presets.clone()) {
                Some(list) => list,
                None => builtin.presets.iter().map(|p| p.to_string()).collect(),
            }
            .iter()
            .map(|p| validate_http_url(p))
            .collect::<Result<Vec<_>, _>>()?
        };

        let output_path = cli
            .out
            .clone()
            .or_else(|| table.and_then(|t| t.out.clone()))
            .unwrap_or_else(|| PathBuf::from(builtin.outfile));

        let catalog_path = if cli.skip_catalog {
            None
        } else {
            Some(
                cli.spreadsheet
                    .clone()
                    .or_else(|| table.and_then(|t| t.catalog.clone()))
                    .unwrap_or_else(|| PathBuf::from(builtin.catalog)),
            )
        };

        let strip_query = cli.strip_sku
            || table
                .and_then(|t| t.strip_sku)
                .unwrap_or(builtin.strip_query);

        let stop = StopConditions {
            stop_after: cli.stop_after,
            cancel_after: cli.cancel_after,
            stop_at: canonical_trigger(cli.stop_at.as_deref(), strip_query)?,
            cancel_at: canonical_trigger(cli.cancel_at.as_deref(), strip_query)?,
        };

        Ok(Self {
            vendor,
            seed,
            presets,
            output_path,
            catalog_path,
            strip_query,
            single_only: cli.single,
            stop,
            memstats: cli.memstats,
        })
    }
}

/// Canonicalizes a stop/cancel URL the way the frontier will see it
fn canonical_trigger(value: Option<&str>, strip_query: bool) -> Result<Option<String>, ConfigError> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let url = canonicalize(None, raw, strip_query)
                .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw, e)))?;
            Ok(Some(url.to_string()))
        }
    }
}

impl fmt::Display for RunSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vendor:       {}", self.vendor)?;
        writeln!(f, "Seed:         {}", self.seed)?;
        for preset in &self.presets {
            writeln!(f, "Preset:       {}", preset)?;
        }
        writeln!(f, "Output:       {}", self.output_path.display())?;
        match &self.catalog_path {
            Some(path) => writeln!(f, "Catalog:      {}", path.display())?,
            None => writeln!(f, "Catalog:      (skipped)")?,
        }
        writeln!(f, "Strip query:  {}", self.strip_query)?;
        writeln!(f, "Single page:  {}", self.single_only)?;
        if let Some(d) = self.stop.stop_after {
            writeln!(f, "Stop after:   {:?}", d)?;
        }
        if let Some(d) = self.stop.cancel_after {
            writeln!(f, "Cancel after: {:?}", d)?;
        }
        if let Some(u) = &self.stop.stop_at {
            writeln!(f, "Stop at:      {}", u)?;
        }
        if let Some(u) = &self.stop.cancel_at {
            writeln!(f, "Cancel at:    {}", u)?;
        }
        if let Some(d) = self.memstats {
            writeln!(f, "Memstats:     every {:?}", d)?;
        }
        Ok(())
    }
}
