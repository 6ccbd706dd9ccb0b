use crate::config::{Config, SourceKind};
use anyhow::{Context, Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Normal, StandardNormal, Uniform};
use serde_json::{Value, json};
use std::time::Duration;

pub const RANDOM_ORG_URL: &str = "https://api.random.org/json-rpc/4/invoke";
pub const QRNG_URL: &str = "https://api.quantumnumbers.anu.edu.au/";

/// Maximum range width accepted by the integer API.
const API_MAX_RANGE: f64 = 1_000_000_000.0;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A generator of random numeric samples constrained to a range.
///
/// Implementations never fail past this boundary: a remote or numerical
/// error degrades to a local draw and a diagnostic, so an unreachable API
/// cannot abort a long-running batch.
pub trait EntropySource {
    fn name(&self) -> &'static str;

    /// Produce `count` samples constrained by the two range bounds,
    /// which may arrive in either order.
    fn generate(&mut self, count: usize, min_val: f64, max_val: f64) -> Vec<f64>;
}

/// Rescale a floating range into the integer domain of the remote API.
///
/// Returns `(min_int, max_int, factor, offset)` such that
/// `scaled = (value - offset) * factor` and the inverse is
/// [`randomorg_to_float`].
///
/// # Errors
/// Fails when the bounds are non-finite or equal, in which case the scale
/// transform is undefined. This is checked before any network call.
pub fn format_float_for_api(min_val: f64, max_val: f64) -> Result<(i64, i64, f64, f64)> {
    if !min_val.is_finite() || !max_val.is_finite() {
        bail!("range bounds must be finite, but are {min_val} and {max_val}");
    }
    if min_val == max_val {
        bail!("min and max values must be different, but both are {min_val}");
    }

    let offset = min_val;
    let factor = API_MAX_RANGE / (max_val - min_val);

    let min_int = ((min_val - offset) * factor) as i64;
    let max_int = ((max_val - offset) * factor) as i64;

    Ok((min_int, max_int, factor, offset))
}

/// Map an integer returned by the remote API back into the original range.
pub fn randomorg_to_float(value: i64, factor: f64, offset: f64) -> f64 {
    value as f64 / factor + offset
}

/// Construct the sources selected by the configuration.
///
/// In dual mode the classical source comes first.
pub fn build_sources(config: &Config) -> Result<Vec<Box<dyn EntropySource>>> {
    let mut sources: Vec<Box<dyn EntropySource>> = Vec::new();

    if config.uses_classical() {
        let api_key = config
            .credentials
            .random_api_key
            .clone()
            .context("missing random.org API key")?;
        sources.push(Box::new(RandomOrgSource::new(api_key)?));
    }
    if config.uses_quantum() {
        let api_key = config
            .credentials
            .qrng_api_key
            .clone()
            .context("missing QRNG API key")?;
        sources.push(Box::new(QuantumSource::new(api_key)?));
    }
    if config.source == SourceKind::Gaussian {
        sources.push(Box::new(GaussianSource::new()?));
    }

    Ok(sources)
}

/// Uniform draw over the bounds in either order; degenerate ranges collapse
/// to a constant.
fn uniform_sample(rng: &mut ChaCha12Rng, count: usize, min_val: f64, max_val: f64) -> Vec<f64> {
    let (low, high) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };

    match Uniform::new(low, high) {
        Ok(dist) => (0..count).map(|_| dist.sample(rng)).collect(),
        Err(_) => vec![low; count],
    }
}

/// Atmospheric noise from the random.org JSON-RPC API.
pub struct RandomOrgSource {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    rng: ChaCha12Rng,
}

impl RandomOrgSource {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_endpoint(api_key, RANDOM_ORG_URL)
    }

    /// Construct against a custom endpoint (used to exercise the fallback path).
    pub fn with_endpoint(api_key: String, endpoint: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            endpoint: endpoint.to_string(),
            api_key,
            rng: ChaCha12Rng::try_from_os_rng()?,
        })
    }

    fn request_integers(&self, count: usize, min_int: i64, max_int: i64) -> Result<Vec<i64>> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "generateIntegers",
            "params": {
                "apiKey": self.api_key,
                "n": count,
                "min": min_int,
                "max": max_int,
                "replacement": true,
            },
            "id": 42,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .context("request failed")?
            .error_for_status()
            .context("request rejected")?;

        let body: Value = response.json().context("failed to parse response body")?;
        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            bail!("random.org API error: {message}");
        }

        body.pointer("/result/random/data")
            .and_then(Value::as_array)
            .context("response carries no random data")?
            .iter()
            .map(|value| value.as_i64().context("non-integer sample in response"))
            .collect()
    }
}

impl EntropySource for RandomOrgSource {
    fn name(&self) -> &'static str {
        "classical"
    }

    fn generate(&mut self, count: usize, min_val: f64, max_val: f64) -> Vec<f64> {
        let (min_int, max_int, factor, offset) = match format_float_for_api(min_val, max_val) {
            Ok(transform) => transform,
            Err(error) => {
                log::warn!(
                    "invalid range for the classical source ({error:#}), \
                     sampling uniform [0, 1] locally"
                );
                return uniform_sample(&mut self.rng, count, 0.0, 1.0);
            }
        };

        // The remote API rejects inverted ranges.
        let (low, high) = if min_int <= max_int {
            (min_int, max_int)
        } else {
            (max_int, min_int)
        };

        match self.request_integers(count, low, high) {
            Ok(integers) => integers
                .into_iter()
                .map(|value| randomorg_to_float(value, factor, offset))
                .collect(),
            Err(error) => {
                log::warn!(
                    "failed to fetch atmospheric noise ({error:#}), \
                     sampling uniform [{min_val}, {max_val}] locally"
                );
                uniform_sample(&mut self.rng, count, min_val, max_val)
            }
        }
    }
}

/// Quantum-measurement noise from the ANU QRNG API.
pub struct QuantumSource {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    rng: ChaCha12Rng,
}

impl QuantumSource {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_endpoint(api_key, QRNG_URL)
    }

    /// Construct against a custom endpoint (used to exercise the fallback path).
    pub fn with_endpoint(api_key: String, endpoint: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            endpoint: endpoint.to_string(),
            api_key,
            rng: ChaCha12Rng::try_from_os_rng()?,
        })
    }

    fn request_bytes(&self, count: usize) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .query(&[
                ("length", count.to_string()),
                ("type", "uint8".to_string()),
                ("size", "1".to_string()),
            ])
            .send()
            .context("request failed")?
            .error_for_status()
            .context("request rejected")?;

        let body: Value = response.json().context("failed to parse response body")?;
        if !body.get("success").and_then(Value::as_bool).unwrap_or(false) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            bail!("QRNG API error: {message}");
        }

        body.get("data")
            .and_then(Value::as_array)
            .context("response carries no data")?
            .iter()
            .map(|value| {
                value
                    .as_u64()
                    .and_then(|byte| u8::try_from(byte).ok())
                    .context("sample outside the uint8 range")
            })
            .collect()
    }
}

impl EntropySource for QuantumSource {
    fn name(&self) -> &'static str {
        "quantum"
    }

    fn generate(&mut self, count: usize, min_val: f64, max_val: f64) -> Vec<f64> {
        // Same validation gate as the classical source, so a degenerate range
        // never reaches the network.
        if let Err(error) = format_float_for_api(min_val, max_val) {
            log::warn!(
                "invalid range for the quantum source ({error:#}), \
                 sampling uniform [0, 1] locally"
            );
            return uniform_sample(&mut self.rng, count, 0.0, 1.0);
        }

        let (low, high) = if min_val <= max_val {
            (min_val, max_val)
        } else {
            (max_val, min_val)
        };

        match self.request_bytes(count) {
            Ok(bytes) => bytes
                .into_iter()
                .map(|byte| low + (byte as f64 / 255.0) * (high - low))
                .collect(),
            Err(error) => {
                log::warn!(
                    "failed to fetch quantum entropy ({error:#}), \
                     sampling uniform [{min_val}, {max_val}] locally"
                );
                uniform_sample(&mut self.rng, count, min_val, max_val)
            }
        }
    }
}

/// Local pseudo-random comparator model.
pub struct GaussianSource {
    rng: ChaCha12Rng,
}

impl GaussianSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rng: ChaCha12Rng::try_from_os_rng()?,
        })
    }
}

impl EntropySource for GaussianSource {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    /// Interprets the range bounds as the mean and standard deviation of the
    /// local model.
    fn generate(&mut self, count: usize, mean: f64, std_dev: f64) -> Vec<f64> {
        match Normal::new(mean, std_dev) {
            Ok(dist) => (0..count).map(|_| dist.sample(&mut self.rng)).collect(),
            Err(error) => {
                log::warn!(
                    "invalid normal parameters ({error}), \
                     sampling the standard normal instead"
                );
                (0..count)
                    .map(|_| StandardNormal.sample(&mut self.rng))
                    .collect()
            }
        }
    }
}

fn build_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build HTTP client")
}
