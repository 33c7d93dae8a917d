//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the blog client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the blog client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BlogConfig {
    /// Persisted client state (preference, session credential).
    pub store: StoreConfig,

    /// The two interchangeable backend providers.
    pub backends: BackendsConfig,

    /// Availability monitor settings.
    pub availability: AvailabilityConfig,

    /// Simulated transport settings.
    pub simulation: SimulationConfig,

    /// Post content rules.
    pub content: ContentConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Client state store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON file holding persisted client state.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "pennedpost-state.json".to_string(),
        }
    }
}

/// Primary and fallback provider definitions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendsConfig {
    pub primary: ProviderConfig,
    pub fallback: ProviderConfig,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            primary: ProviderConfig {
                name: "supabase".to_string(),
                endpoint: "https://your-supabase-url.supabase.co".to_string(),
                api_key: Some("your-supabase-key".to_string()),
                data_path: Some("pennedpost-primary.json".to_string()),
            },
            fallback: ProviderConfig {
                name: "mongodb".to_string(),
                endpoint: "http://localhost:3000/api".to_string(),
                api_key: None,
                data_path: Some("pennedpost-fallback.json".to_string()),
            },
        }
    }
}

/// A single backend provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Provider name, also used as the identifier namespace ("supabase-post-...").
    pub name: String,

    /// Base URL the provider would be reached at.
    pub endpoint: String,

    /// Optional API key sent with remote calls.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Where the simulated provider keeps its data. `None` keeps it in memory.
    #[serde(default)]
    pub data_path: Option<String>,
}

/// Availability monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    /// Enable the background monitor.
    pub enabled: bool,

    /// Tick interval in seconds.
    pub interval_secs: u64,

    /// Consecutive failed probes before the preference is downgraded.
    pub unhealthy_threshold: u32,

    /// How liveness of the primary is probed.
    pub probe: ProbeConfig,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            unhealthy_threshold: 1,
            probe: ProbeConfig::default(),
        }
    }
}

/// Probe flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    /// Ask the simulated link of the primary provider.
    #[default]
    Simulated,
    /// Issue an HTTP GET against `url`.
    Http,
}

/// Liveness probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub kind: ProbeKind,

    /// Health URL of the primary (required for `http`).
    pub url: Option<String>,

    /// Probe timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            kind: ProbeKind::Simulated,
            url: None,
            timeout_secs: 5,
        }
    }
}

/// Simulated transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Base latency added to every remote call in milliseconds.
    pub latency_ms: u64,

    /// Random jitter added on top of the base latency in milliseconds.
    pub jitter_ms: u64,

    /// Whether the primary starts out reachable.
    pub primary_reachable: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            jitter_ms: 0,
            primary_reachable: true,
        }
    }
}

/// Post content configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Number of content characters kept in a derived excerpt.
    pub excerpt_length: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            excerpt_length: 150,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
